//! Core library for the `reportpulse` CLI.
//!
//! This crate provides the metrics pipeline behind the binary: a collector
//! that assembles report-load records, a bounded store persisted through a
//! key-value port, windowed summary statistics, CSV exports, and a cancellable
//! poller for live dashboards. The primary user-facing interface is the
//! `reportpulse` command-line application; library APIs may evolve as the CLI
//! grows.
pub mod args;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod metrics;
pub mod shutdown;
pub mod store;
pub mod summary;

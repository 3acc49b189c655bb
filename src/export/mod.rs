//! CSV exports of stored metric records.
mod csv;
mod file;


pub use csv::{ExportKind, SYSTEM_COLUMNS, VISUAL_COLUMNS, export};
pub use file::{export_file_name, write_export};

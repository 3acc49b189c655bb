use crate::error::MetricsError;

use super::types::{ConnectionInfo, MemoryUsage, NetworkStats, ResourceTiming};

/// Source of best-effort system context for a metric record.
///
/// `Ok(None)` or an empty value means "not available here" and is recorded as
/// absent. `Err` means the probe itself broke, which fails the collection.
pub trait AmbientProbe: Send + Sync {
    fn user_agent(&self) -> Option<String> {
        None
    }

    fn platform(&self) -> Option<String> {
        None
    }

    /// # Errors
    ///
    /// Returns an error when the memory source exists but cannot be read.
    fn memory(&self) -> Result<MemoryUsage, MetricsError> {
        Ok(MemoryUsage::default())
    }

    /// # Errors
    ///
    /// Returns an error when the connection source exists but cannot be read.
    fn connection(&self) -> Result<ConnectionInfo, MetricsError> {
        Ok(ConnectionInfo::default())
    }

    /// # Errors
    ///
    /// Returns an error when the load source exists but cannot be read.
    fn cpu_percent(&self) -> Result<Option<f64>, MetricsError> {
        Ok(None)
    }

    fn network(&self) -> Option<NetworkStats> {
        None
    }

    fn first_contentful_paint(&self) -> Option<f64> {
        None
    }

    fn dom_interactive(&self) -> Option<f64> {
        None
    }

    fn resource_timing(&self) -> Vec<ResourceTiming> {
        Vec::new()
    }
}

/// Reads context for the current host process.
///
/// Memory and load come from procfs on Linux; elsewhere they are absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl AmbientProbe for HostProbe {
    fn user_agent(&self) -> Option<String> {
        Some(format!(
            "reportpulse/{} ({}; {})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    fn platform(&self) -> Option<String> {
        Some(format!(
            "{}-{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    fn memory(&self) -> Result<MemoryUsage, MetricsError> {
        read_process_memory()
    }

    fn cpu_percent(&self) -> Result<Option<f64>, MetricsError> {
        read_load_percent()
    }
}

#[cfg(target_os = "linux")]
fn read_procfs(path: &'static str) -> Result<Option<String>, MetricsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(MetricsError::Probe {
            probe: path,
            source: err,
        }),
    }
}

#[cfg(target_os = "linux")]
fn read_process_memory() -> Result<MemoryUsage, MetricsError> {
    let Some(statm) = read_procfs("/proc/self/statm")? else {
        return Ok(MemoryUsage::default());
    };
    // SAFETY: sysconf has no preconditions and only reads a system constant.
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    let Ok(page_size) = u64::try_from(page_size) else {
        return Ok(MemoryUsage::default());
    };
    let mut parts = statm.split_whitespace();
    let pages = |value: Option<&str>| {
        value
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(|count| count.saturating_mul(page_size))
    };
    let total_bytes = pages(parts.next());
    let used_bytes = pages(parts.next());
    Ok(MemoryUsage {
        used_bytes,
        total_bytes,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_process_memory() -> Result<MemoryUsage, MetricsError> {
    Ok(MemoryUsage::default())
}

/// One-minute load average as a share of available cores, capped at 100.
#[cfg(target_os = "linux")]
fn read_load_percent() -> Result<Option<f64>, MetricsError> {
    let Some(loadavg) = read_procfs("/proc/loadavg")? else {
        return Ok(None);
    };
    let Some(load) = loadavg
        .split_whitespace()
        .next()
        .and_then(|raw| raw.parse::<f64>().ok())
    else {
        return Ok(None);
    };
    let cores = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
    let cores = u32::try_from(cores).unwrap_or(u32::MAX);
    let percent = (load / f64::from(cores) * 100.0).clamp(0.0, 100.0);
    Ok(Some(percent.round()))
}

#[cfg(not(target_os = "linux"))]
fn read_load_percent() -> Result<Option<f64>, MetricsError> {
    Ok(None)
}

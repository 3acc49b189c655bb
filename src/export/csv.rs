use std::fmt::Write as _;

use chrono::SecondsFormat;

use crate::error::ExportError;
use crate::metrics::MetricRecord;

pub const VISUAL_COLUMNS: [&str; 9] = [
    "visualId",
    "type",
    "title",
    "loadTime",
    "renderTime",
    "dataSize",
    "cpu",
    "memory",
    "status",
];

pub const SYSTEM_COLUMNS: [&str; 7] = [
    "timestamp",
    "pageLoadTime",
    "renderTime",
    "memory",
    "cpu",
    "networkLatency",
    "networkBandwidth",
];

const ALL_COLUMNS: [&str; 9] = [
    "timestamp",
    "sessionId",
    "reportName",
    "performance",
    "system",
    "powerbi",
    "user",
    "errors",
    "error",
];

/// Which view of the records to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// One row per visual across all records
    Visual,
    /// One row per record with system counters
    System,
    /// One row per record, nested blocks as JSON cells
    #[default]
    All,
}

impl ExportKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::System => "system",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visual" => Ok(Self::Visual),
            "system" => Ok(Self::System),
            "all" => Ok(Self::All),
            _ => Err(ExportError::UnknownKind {
                value: s.to_owned(),
            }),
        }
    }
}

/// Renders `records` as CSV with a header row, even when there are no rows.
///
/// # Errors
///
/// Returns an error when a nested block cannot be serialized for the `all`
/// view or the output buffer cannot be written.
pub fn export(records: &[MetricRecord], kind: ExportKind) -> Result<String, ExportError> {
    let mut out = String::new();
    match kind {
        ExportKind::Visual => {
            write_row(&mut out, VISUAL_COLUMNS.iter().copied())?;
            for visual in records
                .iter()
                .flat_map(|record| record.powerbi.visual_load_times.iter())
            {
                let cells = [
                    visual.visual_id.clone(),
                    visual.visual_type.clone(),
                    visual.title.clone(),
                    visual.load_time.to_string(),
                    visual.render_time.to_string(),
                    visual.data_size.to_string(),
                    visual.performance.cpu.to_string(),
                    visual.performance.memory.to_string(),
                    visual.status().to_string(),
                ];
                write_row(&mut out, cells.iter().map(String::as_str))?;
            }
        }
        ExportKind::System => {
            write_row(&mut out, SYSTEM_COLUMNS.iter().copied())?;
            for record in records {
                let network = record.system.network.unwrap_or_default();
                let cells = [
                    format_timestamp(record),
                    record.performance.page_load_time.to_string(),
                    record.performance.render_time.to_string(),
                    record.system.memory.used_bytes.unwrap_or(0).to_string(),
                    record.system.cpu.unwrap_or(0.0).to_string(),
                    network.latency.to_string(),
                    network.bandwidth.to_string(),
                ];
                write_row(&mut out, cells.iter().map(String::as_str))?;
            }
        }
        ExportKind::All => {
            write_row(&mut out, ALL_COLUMNS.iter().copied())?;
            for record in records {
                let cells = [
                    format_timestamp(record),
                    record.session_id.clone(),
                    record.report_name.clone(),
                    json_cell("performance", &record.performance)?,
                    json_cell("system", &record.system)?,
                    json_cell("powerbi", &record.powerbi)?,
                    json_cell("user", &record.user)?,
                    record
                        .errors
                        .as_ref()
                        .map_or_else(|| Ok(String::new()), |errors| json_cell("errors", errors))?,
                    record.error.clone().unwrap_or_default(),
                ];
                write_row(&mut out, cells.iter().map(String::as_str))?;
            }
        }
    }
    Ok(out)
}

fn format_timestamp(record: &MetricRecord) -> String {
    record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn json_cell<T: serde::Serialize>(column: &'static str, value: &T) -> Result<String, ExportError> {
    serde_json::to_string(value).map_err(|err| ExportError::SerializeCell {
        column,
        source: err,
    })
}

fn write_row<'cell>(
    out: &mut String,
    cells: impl Iterator<Item = &'cell str>,
) -> Result<(), ExportError> {
    for (index, cell) in cells.enumerate() {
        if index > 0 {
            out.push(',');
        }
        write_cell(out, cell).map_err(|err| ExportError::WriteRow { source: err })?;
    }
    out.push('\n');
    Ok(())
}

/// RFC 4180 quoting: quote when the cell holds a delimiter, quote, or line
/// break, doubling embedded quotes.
fn write_cell(out: &mut String, cell: &str) -> std::fmt::Result {
    let needs_quotes = cell.contains([',', '"', '\n', '\r']);
    if !needs_quotes {
        return write!(out, "{}", cell);
    }
    write!(out, "\"{}\"", cell.replace('"', "\"\""))
}

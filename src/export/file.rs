use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::ExportError;
use crate::metrics::MetricRecord;

use super::csv::{ExportKind, export};

/// `powerbi-metrics-<kind>-<ISO 8601>.csv`
#[must_use]
pub fn export_file_name(kind: ExportKind, now: DateTime<Utc>) -> String {
    format!(
        "powerbi-metrics-{}-{}.csv",
        kind,
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Writes the export into `dir` (created if missing) and returns its path.
///
/// # Errors
///
/// Returns an error when the CSV cannot be rendered or the file cannot be
/// written.
pub async fn write_export(
    dir: &Path,
    kind: ExportKind,
    records: &[MetricRecord],
    now: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let csv = export(records, kind)?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|err| ExportError::CreateDir {
            path: dir.to_path_buf(),
            source: err,
        })?;
    let path = dir.join(export_file_name(kind, now));
    let write_err = |err: std::io::Error| ExportError::WriteFile {
        path: path.clone(),
        source: err,
    };
    let file = tokio::fs::File::create(&path).await.map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(csv.as_bytes()).await.map_err(write_err)?;
    writer.flush().await.map_err(write_err)?;
    tracing::info!("Exported {} metrics to {}", kind, path.display());
    Ok(path)
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to format CSV row: {source}")]
    WriteRow {
        #[source]
        source: std::fmt::Error,
    },
    #[error("Failed to serialize '{column}' cell: {source}")]
    SerializeCell {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to create export directory '{path}': {source}")]
    CreateDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write export '{path}': {source}")]
    WriteFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown export kind '{value}'. Use visual, system, or all.")]
    UnknownKind { value: String },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

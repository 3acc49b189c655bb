use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Report name must not be empty.")]
    EmptyReportName,
    #[error("Invalid {field} '{value}'. Expected a non-negative number of milliseconds.")]
    InvalidDurationMs { field: &'static str, value: String },
    #[error("Invalid visual '{value}'. Expected 'id:type:title'.")]
    InvalidVisualFormat { value: String },
    #[error("Visual id must not be empty in '{value}'.")]
    EmptyVisualId { value: String },
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Invalid number: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid time window '{value}'. Use 1h, 6h, or 24h.")]
    InvalidTimeWindow { value: String },
    #[error("Choose either --out or --stdout, not both.")]
    ExportTargetConflict,
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

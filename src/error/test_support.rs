use super::{ExportError, ValidationError};

impl From<&'static str> for ValidationError {
    fn from(message: &'static str) -> Self {
        ValidationError::TestExpectation { message }
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ExportError {
    fn from(message: &'static str) -> Self {
        ExportError::TestExpectation { message }
    }
}

impl From<String> for ExportError {
    fn from(value: String) -> Self {
        ExportError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

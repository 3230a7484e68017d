//! Error types for the dialect compiler.

use thiserror::Error;

/// The main error type for dialect operations.
#[derive(Debug, Error)]
pub enum DialectError {
    /// Illegal builder call, raised before compilation is attempted.
    #[error("{0}")]
    InvalidRequest(String),

    /// Structural failure while generating SQL. No SQL is produced.
    #[error("{0}")]
    Compile(String),

    /// Type declaration the dialect cannot represent.
    #[error("Invalid type: {0}")]
    InvalidType(String),

    /// Value that does not fit its target type.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Failed to parse a type name or a reflected engine clause.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialectError {
    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a compile error.
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile(message.into())
    }

    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::InvalidType(message.into())
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for dialect operations.
pub type DialectResult<T> = Result<T, DialectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DialectError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_compile_error_message_is_verbatim() {
        let err = DialectError::compile("WHERE clause is required");
        assert_eq!(err.to_string(), "WHERE clause is required");
    }
}

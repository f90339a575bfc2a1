use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Line {line}: cannot convert field '{field}' value '{value}': {message}")]
    FieldCoercionError {
        line: u64,
        field: String,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Row-level problem, the run continues.
    Low,
    /// Bad configuration, nothing was processed.
    Medium,
    /// The input stream could not be read.
    High,
    Critical,
}

impl EtlError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::FieldCoercionError { .. } => ErrorSeverity::Low,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorSeverity::Medium,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorSeverity::High,
            EtlError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 1,
            ErrorSeverity::High => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::IoError(e) => format!("Failed to read the input CSV file: {}", e),
            EtlError::CsvError(e) => format!("The input CSV file is malformed: {}", e),
            EtlError::SerializationError(e) => {
                format!("Failed to render the validated contracts: {}", e)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::IoError(_) => "Check that the input path exists and is readable",
            EtlError::CsvError(_) => {
                "Check the delimiter and that every row has as many columns as the header"
            }
            EtlError::SerializationError(_) => "Report this as a bug",
            EtlError::FieldCoercionError { .. } => "Fix the numeric value in the input row",
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Review the command line options or the TOML configuration file"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_errors_are_high_severity() {
        let err = EtlError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "data.csv",
        ));
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 2);
        assert!(err.user_friendly_message().contains("data.csv"));
    }

    #[test]
    fn test_config_errors_exit_with_one() {
        let err = EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: "expected `]`".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "Configuration error in 'toml_parsing': expected `]`"
        );
    }

    #[test]
    fn test_field_coercion_message_names_line_and_field() {
        let err = EtlError::FieldCoercionError {
            line: 3,
            field: "vlTotal".to_string(),
            value: "abc".to_string(),
            message: "invalid float literal".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(
            err.to_string(),
            "Line 3: cannot convert field 'vlTotal' value 'abc': invalid float literal"
        );
    }
}

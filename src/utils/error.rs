use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Malformed trigger event: {message}")]
    MalformedEvent { message: String },

    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Failed to fetch s3://{bucket}/{key}: {message}")]
    FetchError {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("CSV schema error: {message}")]
    SchemaError { message: String },

    #[error("Invalid GPA value {value:?} on row {row}: {reason}")]
    ParseError {
        row: usize,
        value: String,
        reason: String,
    },

    #[error("No usable data found in {source_name}")]
    EmptyDataset { source_name: String },

    #[error("Failed to decode user record field '{field}': {reason}")]
    DecodeError { field: String, reason: String },

    #[error("Table query failed on '{table}': {message}")]
    QueryError { table: String, message: String },

    #[error("Operation '{operation}' exceeded the invocation deadline")]
    Timeout { operation: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    External,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StatsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StatsError::MalformedEvent { .. } => ErrorCategory::Input,
            StatsError::SchemaError { .. }
            | StatsError::ParseError { .. }
            | StatsError::EmptyDataset { .. }
            | StatsError::DecodeError { .. }
            | StatsError::SerializationError(_) => ErrorCategory::Data,
            StatsError::ObjectNotFound { .. }
            | StatsError::FetchError { .. }
            | StatsError::QueryError { .. }
            | StatsError::Timeout { .. } => ErrorCategory::External,
            StatsError::ConfigError { .. }
            | StatsError::InvalidConfigValueError { .. }
            | StatsError::MissingConfigError { .. } => ErrorCategory::Configuration,
            StatsError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Data => ErrorSeverity::High,
            // 外部服務暫時性錯誤，呼叫端可重新觸發
            ErrorCategory::External => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StatsError::MalformedEvent { .. } => {
                "Check that the trigger is an S3 object-created notification with at least one record"
            }
            StatsError::ObjectNotFound { .. } => {
                "Verify the object key exists in the bucket and was not deleted before processing"
            }
            StatsError::FetchError { .. } => {
                "Check bucket permissions and network access to S3, then re-run"
            }
            StatsError::SchemaError { .. } => {
                "The CSV file must have a header row whose second column is exactly 'GPA'"
            }
            StatsError::ParseError { .. } => {
                "Fix the offending row so that its second column is a decimal number"
            }
            StatsError::EmptyDataset { .. } => "Provide at least one data row or record",
            StatsError::DecodeError { .. } => {
                "Every user record needs id, name, surname, position and a numeric salary"
            }
            StatsError::QueryError { .. } => {
                "Check that the table and index exist and the execution role can read them"
            }
            StatsError::Timeout { .. } => "Increase the function timeout or reduce the input size",
            StatsError::ConfigError { .. }
            | StatsError::InvalidConfigValueError { .. }
            | StatsError::MissingConfigError { .. } => {
                "Review environment variables and the configuration file"
            }
            StatsError::IoError(_) => "Check that the file exists and is readable",
            StatsError::SerializationError(_) => "Check that the input is valid JSON",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StatsError::ObjectNotFound { bucket, key } => {
                format!("找不到檔案 {} (bucket: {})", key, bucket)
            }
            StatsError::ParseError { row, value, .. } => {
                format!("第 {} 列的 GPA 值無效: {:?}", row, value)
            }
            StatsError::EmptyDataset { source_name } => format!("{} 沒有任何資料", source_name),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct_from_fetch_error() {
        let not_found = StatsError::ObjectNotFound {
            bucket: "grades".to_string(),
            key: "missing.csv".to_string(),
        };
        let fetch = StatsError::FetchError {
            bucket: "grades".to_string(),
            key: "missing.csv".to_string(),
            message: "connection reset".to_string(),
        };

        assert!(matches!(not_found, StatsError::ObjectNotFound { .. }));
        assert!(!matches!(fetch, StatsError::ObjectNotFound { .. }));
        assert_eq!(not_found.to_string(), "Object not found: s3://grades/missing.csv");
    }

    #[test]
    fn test_severity_by_category() {
        let parse = StatsError::ParseError {
            row: 2,
            value: "abc".to_string(),
            reason: "invalid float literal".to_string(),
        };
        assert_eq!(parse.category(), ErrorCategory::Data);
        assert_eq!(parse.severity(), ErrorSeverity::High);
        assert!(parse.to_string().contains("\"abc\""));

        let timeout = StatsError::Timeout {
            operation: "s3:GetObject".to_string(),
        };
        assert_eq!(timeout.severity(), ErrorSeverity::Medium);

        let missing = StatsError::MissingConfigError {
            field: "USERS_TABLE".to_string(),
        };
        assert_eq!(missing.severity(), ErrorSeverity::Critical);
    }
}

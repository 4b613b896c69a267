use super::types::ScanError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub exit_code: i32,
}

impl ScanError {
    /// Classify this error to determine its type and the process exit code it maps to.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            ScanError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                exit_code: 2,
            },
            ScanError::InvalidTarget(_) => ErrorClassification {
                error_type: "InvalidTargetError",
                exit_code: 3,
            },
            ScanError::MalformedTemplate { .. } => ErrorClassification {
                error_type: "MalformedTemplate",
                exit_code: 4,
            },
            ScanError::Http(_) => ErrorClassification {
                error_type: "HttpClientError",
                exit_code: 1,
            },
            ScanError::Report(_) => ErrorClassification {
                error_type: "ReportError",
                exit_code: 1,
            },
            ScanError::Io(_) => ErrorClassification {
                error_type: "IoError",
                exit_code: 1,
            },
            ScanError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                exit_code: 1,
            },
            ScanError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                exit_code: 1,
            },
            ScanError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                exit_code: 1,
            },
        }
    }
}

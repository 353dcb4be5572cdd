use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("GitHub API rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("GitHub API returned {status} for {url}")]
    GitHubApiError { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("README content is not valid base64: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("README content is not valid UTF-8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    RateLimit,
    Storage,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code: Low 0, Medium 2, High 1, Critical 3.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Medium => 2,
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

impl UpdateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::GitHubApiError { .. } => ErrorCategory::Network,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::IoError(_) => ErrorCategory::Storage,
            Self::DecodeError(_) | Self::Utf8Error(_) => ErrorCategory::Data,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// Severity drives the process exit code in the binary.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::RateLimit => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::RateLimited { reset_at } => format!(
                "Wait until {} or provide a GITHUB_TOKEN with a higher rate limit",
                reset_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Self::HttpError(_) | Self::GitHubApiError { .. } => {
                "Check network connectivity and the github.api_base setting".to_string()
            }
            Self::IoError(_) => {
                "Check that the working directory exists and is writable".to_string()
            }
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the config file or CLI flags", field)
            }
            Self::DecodeError(_) | Self::Utf8Error(_) => {
                "The offending repository was skipped; rerun with --verbose for details"
                    .to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach GitHub: {}", self),
            ErrorCategory::RateLimit => format!("GitHub rate limit hit: {}", self),
            ErrorCategory::Storage => format!("Could not update local files: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, UpdateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_medium_and_exits_two() {
        let err = UpdateError::RateLimited {
            reset_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        assert_eq!(err.category(), ErrorCategory::RateLimit);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.severity().exit_code(), 2);
        assert!(err.recovery_suggestion().contains("2023-11-14"));
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = UpdateError::MissingConfigError {
            field: "search.keywords".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.severity().exit_code(), 1);
        assert!(err.user_friendly_message().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let err: UpdateError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.severity().exit_code(), 1);
    }

    #[test]
    fn test_github_status_error_is_network() {
        let err = UpdateError::GitHubApiError {
            status: 502,
            url: "https://api.github.com/repos/a/b".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.to_string(), "GitHub API returned 502 for https://api.github.com/repos/a/b");
    }

    #[test]
    fn test_exit_codes_by_severity() {
        assert_eq!(ErrorSeverity::Low.exit_code(), 0);
        assert_eq!(ErrorSeverity::Medium.exit_code(), 2);
        assert_eq!(ErrorSeverity::High.exit_code(), 1);
        assert_eq!(ErrorSeverity::Critical.exit_code(), 3);
    }
}

use thiserror::Error;

/// 表單驗證的拒絕原因，Display 內容即為顯示給填表者的訊息
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Please fill in all the fields.")]
    MissingField,

    #[error("Name should contain only alphabets and spaces.")]
    InvalidName,

    #[error("PRN should be a 9 or 10-digit number.")]
    InvalidPrn,

    #[error("Enter a valid email address.")]
    InvalidEmail,

    #[error("Please select exactly 2 different electives (got {count}).")]
    WrongSelectionCount { count: usize },

    #[error("'{elective}' is not offered this term.")]
    UnknownElective { elective: String },

    #[error("This PRN has already submitted a response.")]
    DuplicatePrn { prn: String },

    #[error("Sorry, '{elective}' is now full. Please choose another elective.")]
    ElectiveFull { elective: String },
}

impl Rejection {
    /// 重複 PRN 只是提醒（已經提交過），其他都是需要修正的錯誤
    pub fn is_warning(&self) -> bool {
        matches!(self, Rejection::DuplicatePrn { .. })
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Enrollment source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    #[error("Failed to record submission: {reason}")]
    WriteFailed { reason: String },

    #[error("Submission rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Invalid submission transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {reason} (value: '{value}')")]
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
    Source,
    Validation,
    Write,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LedgerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::SourceUnavailable { .. } => ErrorCategory::Source,
            LedgerError::WriteFailed { .. } => ErrorCategory::Write,
            LedgerError::Rejected(_) => ErrorCategory::Validation,
            LedgerError::ConfigError { .. }
            | LedgerError::InvalidConfigValueError { .. }
            | LedgerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LedgerError::HttpError(_) | LedgerError::CsvError(_) => ErrorCategory::Source,
            LedgerError::InvalidTransition { .. }
            | LedgerError::IoError(_)
            | LedgerError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LedgerError::Rejected(rejection) if rejection.is_warning() => ErrorSeverity::Low,
            // 快照已過期，必須重新選擇後再提交
            LedgerError::Rejected(Rejection::ElectiveFull { .. })
            | LedgerError::WriteFailed { .. } => ErrorSeverity::Medium,
            LedgerError::Rejected(_) => ErrorSeverity::High,
            LedgerError::ConfigError { .. }
            | LedgerError::InvalidConfigValueError { .. }
            | LedgerError::MissingConfigError { .. } => ErrorSeverity::High,
            LedgerError::SourceUnavailable { .. }
            | LedgerError::HttpError(_)
            | LedgerError::CsvError(_)
            | LedgerError::IoError(_)
            | LedgerError::SerializationError(_)
            | LedgerError::InvalidTransition { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LedgerError::SourceUnavailable { .. } => {
                "Error reading data from the online sheet.".to_string()
            }
            LedgerError::WriteFailed { .. } => {
                "Your submission could not be saved. Please submit again.".to_string()
            }
            LedgerError::Rejected(rejection) => rejection.to_string(),
            LedgerError::ConfigError { message } => format!("Configuration problem: {}", message),
            LedgerError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            LedgerError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            other => format!("Unexpected error: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LedgerError::SourceUnavailable { .. } | LedgerError::HttpError(_) => {
                "Check the sheet URL and network connection, then reload"
            }
            LedgerError::CsvError(_) => "Check that the sheet export has a consistent column layout",
            LedgerError::WriteFailed { .. } => "Reselect your electives and submit again",
            LedgerError::Rejected(Rejection::ElectiveFull { .. }) => {
                "Reload the seat list and pick an elective that still has seats"
            }
            LedgerError::Rejected(Rejection::DuplicatePrn { .. }) => {
                "Contact the admin if you need to change an earlier submission"
            }
            LedgerError::Rejected(_) => "Correct the highlighted field and submit again",
            LedgerError::ConfigError { .. }
            | LedgerError::InvalidConfigValueError { .. }
            | LedgerError::MissingConfigError { .. } => {
                "Review the configuration file or command-line flags"
            }
            _ => "Retry the operation; report it if the problem persists",
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

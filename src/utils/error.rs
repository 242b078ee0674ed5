use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Cannot open source document '{path}': {message}")]
    SourceReadError { path: String, message: String },

    #[error("Text extraction failed on page {page}: {message}")]
    PageExtractionError { page: usize, message: String },

    #[error("Cannot write '{path}': {message}")]
    WriteError { path: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Split worker failed: {message}")]
    WorkerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Page,
    Output,
    Configuration,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SplitError {
    pub fn source_read(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::SourceReadError {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn page_extraction(page: usize, err: impl std::fmt::Display) -> Self {
        Self::PageExtractionError {
            page,
            message: err.to_string(),
        }
    }

    pub fn write(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::WriteError {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceReadError { .. } => ErrorCategory::Source,
            Self::PageExtractionError { .. } => ErrorCategory::Page,
            Self::WriteError { .. } | Self::CsvError(_) | Self::IoError(_) => {
                ErrorCategory::Output
            }
            Self::WorkerError { .. } => ErrorCategory::Runtime,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 逐頁與逐組的錯誤只會降級該組，不會中止整個流程
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PageExtractionError { .. } | Self::WriteError { .. } => ErrorSeverity::Low,
            Self::CsvError(_) => ErrorSeverity::Medium,
            Self::SourceReadError { .. }
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::WorkerError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Source => "Check that the file exists and is a readable, unencrypted PDF",
            ErrorCategory::Page => "Inspect the page in the errors/ folder and split it manually",
            ErrorCategory::Output => "Check free disk space and write permissions on the root folder",
            ErrorCategory::Configuration => "Fix the configuration file or command-line arguments",
            ErrorCategory::Runtime => "Re-run the split; report the issue if it persists",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::SourceReadError { path, .. } => format!("Unable to read the PDF '{}'", path),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Missing setting '{}'", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Download failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input format error in {path}: {message}")]
    InputFormatError { path: String, message: String },

    #[error("Unknown postal code: {code}")]
    UnknownPostalCodeError { code: String },

    #[error("Geodesic distance between {source_code} and {dest_code} did not converge after {iterations} iterations")]
    DistanceConvergenceError {
        source_code: String,
        dest_code: String,
        iterations: usize,
    },

    #[error("Reference data error: {message}")]
    ReferenceDataError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Data,
    Computation,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::InputFormatError { .. } | EtlError::CsvError(_) => ErrorCategory::Input,
            EtlError::UnknownPostalCodeError { .. }
            | EtlError::ReferenceDataError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Data,
            EtlError::DistanceConvergenceError { .. } => ErrorCategory::Computation,
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::ZipError(_) | EtlError::IoError(_) | EtlError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 行程結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::InputFormatError { path, .. } => format!(
                "Check that {} has a header row with the postal code column and consistent row lengths",
                path
            ),
            EtlError::UnknownPostalCodeError { code } => format!(
                "Add {} to the reference dataset, or rerun with --on-unknown skip",
                code
            ),
            EtlError::DistanceConvergenceError { .. } => {
                "The pair is (nearly) antipodal; rerun with --on-non-convergence skip or placeholder"
                    .to_string()
            }
            EtlError::ReferenceDataError { .. } => {
                "Verify the reference file is a GeoNames tab-delimited postal code dump".to_string()
            }
            EtlError::ApiError(_) => {
                "Check network access to the reference URL, or pass --reference with a local copy"
                    .to_string()
            }
            EtlError::ZipError(_) => "The downloaded archive is corrupt; retry the download".to_string(),
            EtlError::CsvError(_) => "Check the CSV file for encoding or quoting problems".to_string(),
            EtlError::IoError(_) => "Check that the paths exist and are accessible".to_string(),
            EtlError::SerializationError(_) => "Try a different --format".to_string(),
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the configuration values and try again".to_string()
            }
            EtlError::ValidationError { .. } => "Check the input values".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::Computation => format!("Distance calculation failed: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

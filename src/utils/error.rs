use thiserror::Error;

#[derive(Error, Debug)]
pub enum IssError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    ApiStatusError { url: String, status: u16 },

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid ISS position: {message}")]
    PositionError { message: String },

    #[error("Tile request at zoom {zoom} returned status {status}")]
    TileError { zoom: u8, status: u16 },

    #[error("Display error: {message}")]
    DisplayError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Imaging,
    Device,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IssError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IssError::ApiError(_) | IssError::ApiStatusError { .. } | IssError::TileError { .. } => {
                ErrorCategory::Network
            }
            IssError::ConfigError { .. }
            | IssError::ConfigValidationError { .. }
            | IssError::InvalidConfigValueError { .. }
            | IssError::MissingConfigError { .. } => ErrorCategory::Configuration,
            IssError::SerializationError(_)
            | IssError::PositionError { .. }
            | IssError::ValidationError { .. } => ErrorCategory::Data,
            IssError::ImageError(_) => ErrorCategory::Imaging,
            IssError::DisplayError { .. } => ErrorCategory::Device,
            IssError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路問題通常下一輪就會恢復
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data | ErrorCategory::Imaging => {
                ErrorSeverity::High
            }
            ErrorCategory::Device | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            IssError::ApiError(_) | IssError::ApiStatusError { .. } => {
                "Check the network connection and that the ISS position endpoint is reachable"
                    .to_string()
            }
            IssError::TileError { status, .. } if *status == 401 || *status == 403 => {
                "Check that MAPBOX_ACCESS_TOKEN (or tiles.access_token) is valid".to_string()
            }
            IssError::TileError { .. } => {
                "The tile provider may be rate limiting; try again later".to_string()
            }
            IssError::ImageError(_) => {
                "The tile endpoint did not return a decodable PNG or JPEG image".to_string()
            }
            IssError::IoError(_) => {
                "Check that the output and export directories are writable".to_string()
            }
            IssError::SerializationError(_) | IssError::PositionError { .. } => {
                "The ISS endpoint returned an unexpected payload; check source.endpoint".to_string()
            }
            IssError::ConfigError { .. }
            | IssError::ConfigValidationError { .. }
            | IssError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line arguments".to_string()
            }
            IssError::MissingConfigError { field } => {
                format!("Set '{}' in the configuration file or environment", field)
            }
            IssError::DisplayError { .. } => {
                "Run clear-display to reset the panel, then try again".to_string()
            }
            IssError::ValidationError { .. } => "Check the input data".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach a remote service: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::Imaging => format!("Could not process the map tile: {}", self),
            ErrorCategory::Device => format!("The display rejected the update: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 依嚴重程度決定程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, IssError>;

use thiserror::Error;

/// Exit code when the document could not be read, parsed or unwrapped, or
/// the configuration is invalid
pub const EXIT_INVALID_INPUT: u8 = 2;

/// Exit code when the service could not be reached or gave no usable result
pub const EXIT_SERVICE_UNAVAILABLE: u8 = 3;

/// Main library error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum DocValError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML document: {details}")]
    MalformedDocument { details: String },

    #[error("Forbidden content in XML document: {details}")]
    ForbiddenContent { details: String },

    #[error("SBDH contains no child document")]
    EmptyEnvelope,

    #[error("Network failure: {url} - {source}")]
    NetworkFailure {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("Server error: {status} for {url} - {message}")]
    ServerError {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DocValError {
    /// The document could not be read, parsed or unwrapped. These abort
    /// before any request is made.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            DocValError::Io(_)
                | DocValError::MalformedDocument { .. }
                | DocValError::ForbiddenContent { .. }
                | DocValError::EmptyEnvelope
        )
    }

    /// The service could not be reached, or did not answer in time.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            DocValError::NetworkFailure { .. } | DocValError::Timeout { .. }
        )
    }

    /// The service answered, but not with a usable validation result.
    pub fn is_server_error(&self) -> bool {
        matches!(self, DocValError::ServerError { .. })
    }

    /// Process exit code for a failed invocation
    pub fn exit_code(&self) -> u8 {
        if self.is_document_error() || matches!(self, DocValError::Config(_)) {
            EXIT_INVALID_INPUT
        } else {
            EXIT_SERVICE_UNAVAILABLE
        }
    }
}

/// Configuration-specific error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DocValError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

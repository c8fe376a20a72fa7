use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid wallet address format: {0}")]
    InvalidAddress(String),

    #[error("Wallet already added: {0}")]
    DuplicateAddress(String),

    #[error("On-chain read failed: {0}")]
    ReadFailure(String),

    #[error("Price not available")]
    QuoteUnavailable,

    #[error("HTTP error: {0}")]
    Http(String),

    #[cfg(feature = "native")]
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[cfg(feature = "native")]
    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialization(String),

    #[error("Initialization error: {0}")]
    Init(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// User-input errors are surfaced as blocking prompts; everything else
    /// degrades a display cell and is retried on the next cycle.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidAddress(_) | CoreError::DuplicateAddress(_) | CoreError::Validation(_)
        )
    }
}

#[cfg(feature = "native")]
impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

#[cfg(feature = "native")]
impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::TomlSerialization(err.to_string())
    }
}

use thiserror::Error;

use anonymizer_generate::GenerationError;

/// Errors emitted while configuring or running anonymization policies.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("store error: {0}")]
    Store(#[from] anonymizer_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PolicyError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True for errors raised by bad policy or strategy setup.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PolicyError::Configuration(_)
                | PolicyError::Generation(GenerationError::Configuration(_))
        )
    }
}

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    #[error("invalid product type: {0}")]
    InvalidProductType(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl PricingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PricingError::InvalidInput(message.into())
    }

    /// Errors caused by the caller's payload rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PricingError::InvalidProductType(_) | PricingError::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;

use agora_core::{Price, Quantity};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Order rejected: non-positive volume {0}")]
    NonPositiveVolume(Quantity),

    #[error("Order rejected: non-positive price {0} after tick rounding")]
    NonPositivePrice(Price),
}

impl ExchangeError {
    /// All exchange errors are input rejections; the engine itself has no
    /// runtime failure modes.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ExchangeError::NonPositiveVolume(_) | ExchangeError::NonPositivePrice(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

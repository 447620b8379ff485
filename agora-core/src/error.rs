use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

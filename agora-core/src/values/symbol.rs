use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A venue or ticker tag.
///
/// Uppercase alphanumeric, 1..=16 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() || s.len() > 16 {
            return Err(CoreError::InvalidSymbol(s));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidSymbol(s));
        }
        Ok(Symbol(s.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

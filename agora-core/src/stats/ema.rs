//! Exponential moving average.

use serde::{Deserialize, Serialize};

/// EMA with update `ema <- ema + alpha * (x - ema)`.
///
/// The first observation initialises the average.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ema {
    value: f64,
    alpha: f64,
    initialized: bool,
}

impl Ema {
    pub fn new(alpha: f64) -> Self {
        Self {
            value: 0.0,
            alpha,
            initialized: false,
        }
    }

    #[inline]
    pub fn update(&mut self, x: f64) {
        if !self.initialized {
            self.value = x;
            self.initialized = true;
        } else {
            self.value += self.alpha * (x - self.value);
        }
    }

    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.initialized.then_some(self.value)
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_initialises() {
        let mut ema = Ema::new(0.94);
        assert!(ema.value().is_none());
        ema.update(100.0);
        assert_eq!(ema.value(), Some(100.0));
    }

    #[test]
    fn test_update_rule() {
        let mut ema = Ema::new(0.5);
        ema.update(100.0);
        ema.update(110.0);
        // 100 + 0.5 * (110 - 100) = 105
        assert_eq!(ema.value(), Some(105.0));
    }

    #[test]
    fn test_converges_to_constant() {
        let mut ema = Ema::new(0.94);
        for _ in 0..200 {
            ema.update(50.0);
        }
        assert!((ema.value().unwrap() - 50.0).abs() < 1e-9);
    }
}

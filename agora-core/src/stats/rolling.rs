//! Fixed-size rolling window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A bounded window over the most recent observations.
///
/// Pushing beyond capacity evicts the oldest value. Mean is O(1) via a
/// running sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, x: f64) {
        if self.values.len() >= self.capacity {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.values.push_back(x);
        self.sum += x;
    }

    #[inline]
    pub fn mean(&self) -> Option<f64> {
        (!self.values.is_empty()).then(|| self.sum / self.values.len() as f64)
    }

    #[inline]
    pub fn first(&self) -> Option<f64> {
        self.values.front().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

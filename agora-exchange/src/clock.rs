//! Monotonic simulation clock.
//!
//! Orders are acknowledged with monotonic nanosecond stamps. Wall-clock time
//! is never read: each read advances the counter by a fixed quantum, which
//! keeps runs bit-for-bit reproducible.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    nanos: u64,
    quantum: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::with_quantum(1)
    }

    pub fn with_quantum(quantum: u64) -> Self {
        Self {
            nanos: 0,
            quantum: quantum.max(1),
        }
    }

    /// Advance and return the new timestamp. Strictly increasing.
    #[inline]
    pub fn next(&mut self) -> u64 {
        self.nanos += self.quantum;
        self.nanos
    }

    /// The last timestamp handed out
    #[inline]
    pub fn now(&self) -> u64 {
        self.nanos
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

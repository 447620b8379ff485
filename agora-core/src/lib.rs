//! Core value objects and online statistics for the agora market simulator.
//!
//! Everything in this crate is a plain value: fixed-point prices, whole-share
//! quantities, trader identities, and the small statistical accumulators the
//! agent strategies run on. No I/O, no clocks, no randomness.

pub mod stats;
pub mod values;

mod error;

pub use error::CoreError;
pub use stats::{Ema, RollingWindow, Welford};
pub use values::{Price, Quantity, Side, Strategy, Symbol, TraderId};

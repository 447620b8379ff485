//! Online statistics for agent decision rules.

mod ema;
mod rolling;
mod welford;

pub use ema::Ema;
pub use rolling::RollingWindow;
pub use welford::Welford;

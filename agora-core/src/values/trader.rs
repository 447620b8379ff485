//! Trader identity
//!
//! A trader is addressed by its strategy tag plus a per-strategy index. The
//! pair is the callback address the matching engine uses to route execution
//! reports back to the owning agent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy tag for an agent population member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Noise,
    MarketMaker,
    LiquidityConsumer,
    Momentum,
    MeanReversion,
    /// Pluggable slot for a strategy under evaluation
    Custom,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Noise => "noise",
            Strategy::MarketMaker => "market_maker",
            Strategy::LiquidityConsumer => "liquidity_consumer",
            Strategy::Momentum => "momentum",
            Strategy::MeanReversion => "mean_reversion",
            Strategy::Custom => "custom",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unique identifier for a trader: strategy tag + agent index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraderId {
    pub strategy: Strategy,
    pub index: u32,
}

impl TraderId {
    pub const fn new(strategy: Strategy, index: u32) -> Self {
        Self { strategy, index }
    }
}

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.strategy, self.index)
    }
}

//! Momentum trader
//!
//! Chases short-horizon trends in traded prices: a rate-of-change above the
//! threshold triggers a market order scaled by available cash, amplifying
//! moves and feeding the volatility-clustering loop.

use super::{Agent, AgentError, TraderState};
use agora_core::{Quantity, RollingWindow, Strategy, TraderId};
use agora_exchange::{ExecutionReport, MatchingEngine, OrderbookEvent};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Probability of evaluating the signal in a timestep
    pub delta: f64,
    /// Trade-price window length
    pub window: usize,
    /// Minimum |ROC| to trigger a trade
    pub threshold: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            delta: 0.4,
            window: 5,
            threshold: 0.001,
        }
    }
}

pub struct MomentumTrader {
    state: TraderState,
    config: MomentumConfig,
    trade_prices: RollingWindow,
    rng: StdRng,
}

impl MomentumTrader {
    pub fn new(index: u32, config: MomentumConfig, cash: f64, seed: u64) -> Self {
        Self {
            state: TraderState::new(TraderId::new(Strategy::Momentum, index), cash),
            trade_prices: RollingWindow::new(config.window),
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Signed rate of change from the window tail to the newest trade
    fn roc(&self) -> Option<f64> {
        if !self.trade_prices.is_full() {
            return None;
        }
        let tail = self.trade_prices.first()?;
        let now = self.trade_prices.last()?;
        (tail != 0.0).then(|| (now - tail) / tail)
    }
}

impl Agent for MomentumTrader {
    fn trader_id(&self) -> TraderId {
        self.state.id
    }

    fn actuate(&mut self, engine: &mut MatchingEngine) -> Result<(), AgentError> {
        if self.rng.r#gen::<f64>() >= self.config.delta {
            return Ok(());
        }

        let Some(roc) = self.roc() else {
            return Ok(());
        };

        // Cash-scaled sizing; an empty wallet means no trade
        let volume = Quantity::new((roc.abs() * self.state.cash).round() as i64);
        if !volume.is_positive() {
            return Ok(());
        }
        if roc >= self.config.threshold {
            engine.buy_market_order(self.state.id, volume)?;
        } else if roc <= -self.config.threshold {
            engine.sell_market_order(self.state.id, volume)?;
        }
        Ok(())
    }

    fn on_execution_report(&mut self, report: &ExecutionReport) {
        self.state.apply_report(report);
        self.state.settle(report);
    }

    fn on_public_event(&mut self, event: &OrderbookEvent) {
        if event.transaction {
            self.trade_prices.push(event.price.to_f64());
        }
    }

    fn cash(&self) -> f64 {
        self.state.cash
    }
}

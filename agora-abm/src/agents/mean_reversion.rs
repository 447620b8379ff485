//! Mean-reversion trader
//!
//! Bets that traded prices revert toward their exponential average: when the
//! last trade stretches more than k standard deviations away from the EMA it
//! posts a single-share limit order one tick inside the touch, dampening
//! extremes and supplying liquidity where it is thinnest.

use super::{Agent, AgentError, TraderState};
use agora_core::{Ema, Quantity, Side, Strategy, TraderId, Welford};
use agora_exchange::{ExecutionReport, MatchingEngine, OrderbookEvent};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanReversionConfig {
    /// Probability of evaluating the signal in a timestep
    pub delta: f64,
    /// Band width in standard deviations
    pub k: f64,
    /// EMA weight
    pub alpha: f64,
    /// Order size in shares
    pub volume: i64,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            delta: 0.4,
            k: 1.0,
            alpha: 0.94,
            volume: 1,
        }
    }
}

pub struct MeanReversionTrader {
    state: TraderState,
    config: MeanReversionConfig,
    /// Cumulative trade-price moments over the run
    moments: Welford,
    ema: Ema,
    rng: StdRng,
}

impl MeanReversionTrader {
    pub fn new(index: u32, config: MeanReversionConfig, cash: f64, seed: u64) -> Self {
        Self {
            state: TraderState::new(TraderId::new(Strategy::MeanReversion, index), cash),
            moments: Welford::new(),
            ema: Ema::new(config.alpha),
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for MeanReversionTrader {
    fn trader_id(&self) -> TraderId {
        self.state.id
    }

    fn actuate(&mut self, engine: &mut MatchingEngine) -> Result<(), AgentError> {
        if self.rng.r#gen::<f64>() >= self.config.delta {
            return Ok(());
        }

        let (Some(std_dev), Some(ema)) = (self.moments.std_dev(), self.ema.value()) else {
            return Ok(());
        };
        if std_dev <= 0.0 {
            return Ok(());
        }

        let bid = engine.bid_price();
        let ask = engine.ask_price();
        if !bid.is_positive() || !ask.is_positive() {
            return Ok(());
        }

        let last = engine.last_price().to_f64();
        let tick = engine.tick_size();
        let volume = Quantity::new(self.config.volume);
        let band = self.config.k * std_dev;

        if last - ema >= band {
            // Stretched high: sell one tick inside the ask
            let px = ask.saturating_sub(tick);
            if let Ok(order) = engine.sell_limit_order(self.state.id, px, volume) {
                self.state.track(&order);
            }
        } else if ema - last >= band {
            // Stretched low: buy one tick inside the bid
            let px = bid + tick;
            if let Ok(order) = engine.buy_limit_order(self.state.id, px, volume) {
                self.state.track(&order);
            }
        }
        Ok(())
    }

    fn on_execution_report(&mut self, report: &ExecutionReport) {
        self.state.apply_report(report);
        self.state.settle(report);
    }

    fn on_public_event(&mut self, event: &OrderbookEvent) {
        if event.transaction {
            let price = event.price.to_f64();
            self.moments.push(price);
            self.ema.update(price);
        }
    }

    fn cash(&self) -> f64 {
        self.state.cash
    }
}

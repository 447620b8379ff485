//! Market maker
//!
//! Watches the public feed for incoming order flow and predicts the next
//! order's side from a sliding window of recent sides. Quotes both touches,
//! sizing up the side that leans against the predicted flow.

use super::{Agent, AgentError, TraderState};
use agora_core::{Quantity, RollingWindow, Side, Strategy, TraderId};
use agora_exchange::{ExecutionReport, MatchingEngine, OrderbookEvent};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMakerConfig {
    /// Probability of re-quoting in a timestep
    pub delta: f64,
    /// Sliding window length over observed order sides
    pub window: usize,
    /// Upper bound of the large quote leg
    pub max_volume: i64,
    /// Size of the small quote leg
    pub min_volume: i64,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            window: 50,
            max_volume: 200_000,
            min_volume: 1,
        }
    }
}

pub struct MarketMaker {
    state: TraderState,
    config: MarketMakerConfig,
    /// Recent order sides as 0.0 (buy) / 1.0 (sell)
    side_window: RollingWindow,
    rng: StdRng,
}

impl MarketMaker {
    pub fn new(index: u32, config: MarketMakerConfig, cash: f64, seed: u64) -> Self {
        Self {
            state: TraderState::new(TraderId::new(Strategy::MarketMaker, index), cash),
            side_window: RollingWindow::new(config.window),
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Mean of the side window: toward 0 = buy-heavy flow, toward 1 =
    /// sell-heavy flow.
    fn prediction(&self) -> f64 {
        self.side_window.mean().unwrap_or(0.5)
    }
}

impl Agent for MarketMaker {
    fn trader_id(&self) -> TraderId {
        self.state.id
    }

    fn actuate(&mut self, engine: &mut MatchingEngine) -> Result<(), AgentError> {
        let prediction = self.prediction();

        if self.rng.r#gen::<f64>() >= self.config.delta {
            return Ok(());
        }

        // Re-quote from a clean slate
        let open: Vec<_> = self.state.outstanding.values().cloned().collect();
        for order in &open {
            engine.cancel_order(order);
        }

        let bid = engine.bid_price();
        let ask = engine.ask_price();
        if !bid.is_positive() || !ask.is_positive() {
            return Ok(());
        }

        let big = Quantity::new(self.rng.gen_range(1..=self.config.max_volume));
        let small = Quantity::new(self.config.min_volume);

        let (bid_vol, ask_vol) = if prediction < 0.5 {
            (small, big)
        } else {
            (big, small)
        };

        if let Ok(order) = engine.sell_limit_order(self.state.id, ask, ask_vol) {
            self.state.track(&order);
        }
        if let Ok(order) = engine.buy_limit_order(self.state.id, bid, bid_vol) {
            self.state.track(&order);
        }

        // Notional of both legs is committed up front
        let committed = ask.to_f64() * ask_vol.to_f64() + bid.to_f64() * bid_vol.to_f64();
        self.state.debit(committed);

        Ok(())
    }

    fn on_execution_report(&mut self, report: &ExecutionReport) {
        self.state.apply_report(report);
    }

    fn on_public_event(&mut self, event: &OrderbookEvent) {
        if event.kind.is_new_order() {
            self.side_window.push(event.direction.as_index() as f64);
        }
    }

    fn cash(&self) -> f64 {
        self.state.cash
    }
}

//! Noise trader
//!
//! Submits randomised market orders, limit orders at calibrated distances
//! from the touch, and cancellations. Provides baseline order flow and
//! re-establishes quoting whenever a book side empties, which makes it the
//! scheduler's bootstrap agent of choice.

use super::{shares, Agent, AgentError, TraderState};
use agora_core::{Price, Quantity, Side, Strategy, TraderId};
use agora_exchange::{ExecutionReport, MatchingEngine};
use rand::prelude::*;
use rand_distr::LogNormal;
use serde::{Deserialize, Serialize};

/// Calibrated action probabilities and size distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Probability of acting at all in a timestep
    pub delta: f64,
    /// P(market order | acting)
    pub market_fraction: f64,
    /// P(limit order | acting)
    pub limit_fraction: f64,
    /// Log-normal location/scale of market-order sizes
    pub mu_market: f64,
    pub sigma_market: f64,
    /// Log-normal location/scale of limit-order sizes
    pub mu_limit: f64,
    pub sigma_limit: f64,
    /// Limit placement split: crossing / inside spread / at touch
    pub p_cross: f64,
    pub p_inside: f64,
    pub p_spread: f64,
    /// Power-law offset for off-spread placement
    pub x_min: f64,
    pub beta: f64,
    /// Quote re-seeding anchors for an empty book
    pub default_price: f64,
    pub default_spread: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            delta: 0.75,
            market_fraction: 0.03,
            limit_fraction: 0.54,
            mu_market: 7.0,
            sigma_market: 0.1,
            mu_limit: 8.0,
            sigma_limit: 0.7,
            p_cross: 0.003,
            p_inside: 0.098,
            p_spread: 0.173,
            x_min: 0.005,
            beta: 2.72,
            default_price: 100.0,
            default_spread: 0.05,
        }
    }
}

pub struct NoiseTrader {
    state: TraderState,
    config: NoiseConfig,
    market_size: LogNormal<f64>,
    limit_size: LogNormal<f64>,
    rng: StdRng,
}

impl NoiseTrader {
    pub fn new(index: u32, config: NoiseConfig, cash: f64, seed: u64) -> Self {
        let market_size = LogNormal::new(config.mu_market, config.sigma_market)
            .expect("market size distribution parameters");
        let limit_size = LogNormal::new(config.mu_limit, config.sigma_limit)
            .expect("limit size distribution parameters");
        Self {
            state: TraderState::new(TraderId::new(Strategy::Noise, index), cash),
            config,
            market_size,
            limit_size,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn limit_volume(&mut self) -> Quantity {
        shares(self.limit_size.sample(&mut self.rng))
    }

    /// Re-establish quoting on whichever side is missing, then stand down
    /// for the rest of the actuation.
    fn requote(&mut self, engine: &mut MatchingEngine) -> Result<(), AgentError> {
        let bid_empty = engine.is_side_empty(Side::Buy);
        let ask_empty = engine.is_side_empty(Side::Sell);
        let tick = engine.tick_size();

        let (bid_px, ask_px) = if bid_empty && ask_empty {
            (
                Price::from_f64(self.config.default_price),
                Price::from_f64(self.config.default_price + self.config.default_spread),
            )
        } else if bid_empty {
            let ask = engine.ask_price();
            (
                ask.saturating_sub(Price::from_f64(self.config.default_spread)),
                ask,
            )
        } else {
            let bid = engine.bid_price();
            (
                bid,
                bid + Price::from_f64(self.config.default_spread),
            )
        };

        if bid_empty {
            let vol = self.limit_volume();
            let px = bid_px.round_to_tick(tick);
            if let Ok(order) = engine.buy_limit_order(self.state.id, px, vol) {
                self.state.track(&order);
            }
        }
        if ask_empty {
            let vol = self.limit_volume();
            let px = ask_px.round_to_tick(tick);
            if let Ok(order) = engine.sell_limit_order(self.state.id, px, vol) {
                self.state.track(&order);
            }
        }
        Ok(())
    }

    fn submit_market(&mut self, engine: &mut MatchingEngine, side: Side) -> Result<(), AgentError> {
        // Capped at half the liquidity resting at the opposite touch
        let opposite_best = match side {
            Side::Buy => engine.ask_size(),
            Side::Sell => engine.bid_size(),
        };
        if !opposite_best.is_positive() {
            return Ok(());
        }
        let drawn = self.market_size.sample(&mut self.rng);
        let volume = shares(drawn).min(opposite_best.half());
        if !volume.is_positive() {
            return Ok(());
        }
        let result = match side {
            Side::Buy => engine.buy_market_order(self.state.id, volume),
            Side::Sell => engine.sell_market_order(self.state.id, volume),
        };
        result?;
        Ok(())
    }

    fn submit_limit(&mut self, engine: &mut MatchingEngine, side: Side) -> Result<(), AgentError> {
        let bid = engine.bid_price();
        let ask = engine.ask_price();
        let tick = engine.tick_size();
        let spread = ask.saturating_sub(bid);

        let placement = self.rng.r#gen::<f64>();
        let price = if placement < self.config.p_cross {
            // Crossing: take the opposite touch
            match side {
                Side::Buy => ask,
                Side::Sell => bid,
            }
        } else if placement < self.config.p_cross + self.config.p_inside {
            self.inside_spread_price(bid, ask, tick)
        } else if placement < self.config.p_cross + self.config.p_inside + self.config.p_spread {
            // Join the own-side touch
            match side {
                Side::Buy => bid,
                Side::Sell => ask,
            }
        } else {
            // Off-spread: power-law distance beyond the touch
            let u = self.rng.r#gen::<f64>();
            let offset =
                spread.to_f64() + self.config.x_min * (1.0 - u).powf(-1.0 / (self.config.beta - 1.0));
            let offset = Price::from_f64(offset);
            match side {
                Side::Buy => bid.saturating_sub(offset),
                Side::Sell => ask + offset,
            }
        };

        let volume = self.limit_volume();
        let result = match side {
            Side::Buy => engine.buy_limit_order(self.state.id, price, volume),
            Side::Sell => engine.sell_limit_order(self.state.id, price, volume),
        };
        // A degenerate off-spread price can round below the grid; that
        // rejection is the end of this actuation, not a fault.
        if let Ok(order) = result {
            self.state.track(&order);
        }
        Ok(())
    }

    /// Uniform draw on the tick grid strictly between the touches; falls
    /// back to the own-side touch when the spread is a single tick.
    fn inside_spread_price(&mut self, bid: Price, ask: Price, tick: Price) -> Price {
        let gap_ticks = (ask.raw() - bid.raw()) / tick.raw();
        if gap_ticks <= 1 {
            return bid;
        }
        let step = self.rng.gen_range(1..gap_ticks);
        Price::from_raw(bid.raw() + step * tick.raw())
    }

    fn cancel_one(&mut self, engine: &mut MatchingEngine) {
        // The most recent outstanding order, as the strategy is calibrated
        if let Some(order) = self.state.newest().cloned() {
            engine.cancel_order(&order);
        }
    }
}

impl Agent for NoiseTrader {
    fn trader_id(&self) -> TraderId {
        self.state.id
    }

    fn actuate(&mut self, engine: &mut MatchingEngine) -> Result<(), AgentError> {
        if engine.is_side_empty(Side::Buy) || engine.is_side_empty(Side::Sell) {
            return self.requote(engine);
        }

        if self.rng.r#gen::<f64>() >= self.config.delta {
            return Ok(());
        }

        let side = if self.rng.r#gen::<bool>() {
            Side::Buy
        } else {
            Side::Sell
        };

        let action = self.rng.r#gen::<f64>();
        if action < self.config.market_fraction {
            self.submit_market(engine, side)
        } else if action < self.config.market_fraction + self.config.limit_fraction {
            self.submit_limit(engine, side)
        } else {
            self.cancel_one(engine);
            Ok(())
        }
    }

    fn on_execution_report(&mut self, report: &ExecutionReport) {
        self.state.apply_report(report);
        self.state.settle(report);
    }

    fn cash(&self) -> f64 {
        self.state.cash
    }
}

//! Liquidity consumer
//!
//! Works a large parent order over the day: each timestep it looks at the
//! liquidity available at the opposite touch and either takes it with a
//! market order or lets the opportunity pass, writing the slice off its
//! target either way.

use super::{Agent, AgentError, TraderState};
use agora_core::{Quantity, Side, Strategy, TraderId};
use agora_exchange::{ExecutionReport, MatchingEngine};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityConsumerConfig {
    /// Probability of actually crossing the spread for a slice
    pub delta: f64,
    /// Upper bound of the randomly drawn parent-order volume
    pub max_initial_volume: i64,
}

impl Default for LiquidityConsumerConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            max_initial_volume: 100_000,
        }
    }
}

pub struct LiquidityConsumer {
    state: TraderState,
    config: LiquidityConsumerConfig,
    side: Side,
    /// Volume still to execute (or abandon)
    remaining: Quantity,
    rng: StdRng,
}

impl LiquidityConsumer {
    pub fn new(index: u32, config: LiquidityConsumerConfig, cash: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let side = if rng.r#gen::<bool>() {
            Side::Buy
        } else {
            Side::Sell
        };
        let remaining = Quantity::new(rng.gen_range(1..=config.max_initial_volume));
        Self {
            state: TraderState::new(TraderId::new(Strategy::LiquidityConsumer, index), cash),
            config,
            side,
            remaining,
            rng,
        }
    }

    pub fn remaining(&self) -> Quantity {
        self.remaining
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

impl Agent for LiquidityConsumer {
    fn trader_id(&self) -> TraderId {
        self.state.id
    }

    fn actuate(&mut self, engine: &mut MatchingEngine) -> Result<(), AgentError> {
        if !self.remaining.is_positive() {
            return Ok(());
        }

        let available = match self.side {
            Side::Buy => engine.ask_size(),
            Side::Sell => engine.bid_size(),
        };
        let slice = self.remaining.min(available);
        if !slice.is_positive() {
            return Ok(());
        }

        if self.rng.r#gen::<f64>() < self.config.delta {
            let result = match self.side {
                Side::Buy => engine.buy_market_order(self.state.id, slice),
                Side::Sell => engine.sell_market_order(self.state.id, slice),
            };
            result?;
        }

        // The slice is written off whether or not it traded
        self.remaining = self.remaining - slice;
        Ok(())
    }

    fn on_execution_report(&mut self, report: &ExecutionReport) {
        self.state.apply_report(report);
        self.state.settle(report);
    }

    fn cash(&self) -> f64 {
        self.state.cash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Price;
    use agora_exchange::{EngineConfig, NullSink};

    fn engine_with_quotes(depth: i64) -> MatchingEngine {
        let mut engine = MatchingEngine::new(EngineConfig::default(), Box::new(NullSink));
        let seeder = TraderId::new(Strategy::Noise, 0);
        engine
            .buy_limit_order(seeder, Price::from_f64(99.99), Quantity::new(depth))
            .unwrap();
        engine
            .sell_limit_order(seeder, Price::from_f64(100.01), Quantity::new(depth))
            .unwrap();
        engine
    }

    #[test]
    fn test_target_decrements_even_without_trade() {
        let mut engine = engine_with_quotes(500);
        let mut lc = LiquidityConsumer::new(
            0,
            LiquidityConsumerConfig {
                delta: 0.0, // never trades
                ..Default::default()
            },
            20_000.0,
            42,
        );
        let start = lc.remaining();

        lc.actuate(&mut engine).unwrap();

        assert_eq!(lc.remaining(), start.saturating_sub(Quantity::new(500)));
        assert_eq!(engine.order_count(), 2); // book untouched
    }

    #[test]
    fn test_takes_at_most_touch_size() {
        let mut engine = engine_with_quotes(300);
        let mut lc = LiquidityConsumer::new(
            0,
            LiquidityConsumerConfig {
                delta: 1.0, // always trades
                ..Default::default()
            },
            1_000_000.0,
            42,
        );

        lc.actuate(&mut engine).unwrap();

        // One touch was swept (or partially, if the target was below 300)
        let consumed = match lc.side() {
            Side::Buy => 300 - engine.ask_size().raw(),
            Side::Sell => 300 - engine.bid_size().raw(),
        };
        assert!(consumed > 0 && consumed <= 300);
    }

    #[test]
    fn test_stops_when_target_exhausted() {
        let mut engine = engine_with_quotes(1_000_000);
        let mut lc = LiquidityConsumer::new(
            0,
            LiquidityConsumerConfig {
                delta: 0.0,
                max_initial_volume: 100,
            },
            20_000.0,
            7,
        );

        lc.actuate(&mut engine).unwrap();
        assert!(!lc.remaining().is_positive());

        let events = engine.events_emitted();
        lc.actuate(&mut engine).unwrap();
        assert_eq!(engine.events_emitted(), events); // fully idle
    }
}

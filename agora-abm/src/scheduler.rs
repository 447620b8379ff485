//! Market scheduler
//!
//! One timestep = one pass over the agent list. The scheduler guarantees the
//! book is two-sided before the pass begins, actuates each agent to
//! completion, and drains the engine's report and feed mailboxes between
//! actuations so every agent observes a consistent, ordered stream.

use crate::agents::Agent;
use agora_core::{Side, Strategy, TraderId};
use agora_exchange::{MatchingEngine, OrderbookEvent};
use rand::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Attempts at re-seeding an empty book before giving up on a timestep
const BOOTSTRAP_ATTEMPTS: u32 = 16;

/// Aggregates accumulated over a run.
#[derive(Debug, Clone, Default)]
pub struct SimulationMetrics {
    pub timesteps: u64,
    pub total_orders: u64,
    pub total_trades: u64,
    pub total_volume: i64,
    pub orders_by_strategy: HashMap<Strategy, u64>,
    pub avg_spread: f64,
}

impl SimulationMetrics {
    fn observe(&mut self, event: &OrderbookEvent) {
        if event.kind.is_new_order() {
            self.total_orders += 1;
            *self.orders_by_strategy.entry(event.trader.strategy).or_insert(0) += 1;
        }
        if event.transaction {
            self.total_trades += 1;
            self.total_volume += event.volume.raw();
        }
    }

    fn record_spread(&mut self, spread: f64) {
        let t = self.timesteps as f64 + 1.0;
        self.avg_spread = (self.avg_spread * (t - 1.0) + spread) / t;
    }
}

pub struct MarketScheduler {
    engine: MatchingEngine,
    agents: Vec<Box<dyn Agent>>,
    by_trader: HashMap<TraderId, usize>,
    /// Actuation order for the current pass (indices into `agents`)
    order: Vec<usize>,
    halted: Vec<bool>,
    /// The designated bootstrap agent (first noise trader added)
    bootstrap: Option<usize>,
    timestep: u64,
    rng: StdRng,
    metrics: SimulationMetrics,
}

impl MarketScheduler {
    pub fn new(engine: MatchingEngine, seed: u64) -> Self {
        Self {
            engine,
            agents: Vec::new(),
            by_trader: HashMap::new(),
            order: Vec::new(),
            halted: Vec::new(),
            bootstrap: None,
            timestep: 0,
            rng: StdRng::seed_from_u64(seed),
            metrics: SimulationMetrics::default(),
        }
    }

    pub fn add_agent(&mut self, agent: Box<dyn Agent>) {
        let id = agent.trader_id();
        let idx = self.agents.len();
        if self.bootstrap.is_none() && id.strategy == Strategy::Noise {
            self.bootstrap = Some(idx);
        }
        self.by_trader.insert(id, idx);
        self.order.push(idx);
        self.halted.push(false);
        self.agents.push(agent);
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MatchingEngine {
        &mut self.engine
    }

    pub fn agents(&self) -> &[Box<dyn Agent>] {
        &self.agents
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    /// Run `timesteps` passes, then flush the sink and log the run summary.
    pub fn run(&mut self, timesteps: u64) {
        for _ in 0..timesteps {
            self.step();
        }
        self.engine.flush_sink();
        info!(
            timesteps = self.metrics.timesteps,
            orders = self.metrics.total_orders,
            trades = self.metrics.total_trades,
            volume = self.metrics.total_volume,
            avg_spread = self.metrics.avg_spread,
            "run complete"
        );
    }

    /// One timestep: bootstrap, pass, mid sample, reshuffle.
    pub fn step(&mut self) {
        self.engine.set_timestep(self.timestep);
        self.ensure_two_sided_book();

        let order = self.order.clone();
        for idx in order {
            if self.halted[idx] {
                continue;
            }
            self.actuate(idx);
        }

        self.engine.record_mid_price();
        if self.engine.bid_price().is_positive() && self.engine.ask_price().is_positive() {
            let spread = self.engine.ask_price().to_f64() - self.engine.bid_price().to_f64();
            self.metrics.record_spread(spread);
        }

        self.metrics.timesteps += 1;
        self.timestep += 1;
        self.order.shuffle(&mut self.rng);
    }

    /// Book-non-empty invariant: actuate the bootstrap noise trader until
    /// both sides quote.
    fn ensure_two_sided_book(&mut self) {
        let mut attempts = 0;
        while self.engine.is_side_empty(Side::Buy) || self.engine.is_side_empty(Side::Sell) {
            let Some(idx) = self.bootstrap.filter(|&i| !self.halted[i]) else {
                warn!(timestep = self.timestep, "no bootstrap agent available for an empty book");
                return;
            };
            self.actuate(idx);

            attempts += 1;
            if attempts >= BOOTSTRAP_ATTEMPTS {
                warn!(timestep = self.timestep, "book still one-sided after bootstrap attempts");
                return;
            }
        }
    }

    /// Actuate one agent, then deliver everything its actions produced.
    fn actuate(&mut self, idx: usize) {
        if let Err(e) = self.agents[idx].actuate(&mut self.engine) {
            // Fault isolation: the agent stops acting, the market does not
            warn!(
                trader = %self.agents[idx].trader_id(),
                error = %e,
                "agent fault; isolating for the rest of the run"
            );
            self.halted[idx] = true;
        }
        self.deliver();
    }

    /// Drain execution reports to their owners and fan feed events out to
    /// every subscriber, preserving emission order.
    fn deliver(&mut self) {
        for (trader, report) in self.engine.drain_reports() {
            match self.by_trader.get(&trader) {
                Some(&i) => self.agents[i].on_execution_report(&report),
                None => debug!(%trader, "execution report for unknown trader dropped"),
            }
        }

        for event in self.engine.drain_feed() {
            self.metrics.observe(&event);
            for agent in self.agents.iter_mut() {
                agent.on_public_event(&event);
            }
        }
    }
}

//! Agent framework
//!
//! Agents are variants of a strategy tag plus per-strategy state, dispatched
//! through a small capability set: actuate once per timestep, absorb
//! execution reports between actuations, observe the public feed.

mod liquidity_consumer;
mod market_maker;
mod mean_reversion;
mod momentum;
mod noise;

pub use liquidity_consumer::{LiquidityConsumer, LiquidityConsumerConfig};
pub use market_maker::{MarketMaker, MarketMakerConfig};
pub use mean_reversion::{MeanReversionConfig, MeanReversionTrader};
pub use momentum::{MomentumConfig, MomentumTrader};
pub use noise::{NoiseConfig, NoiseTrader};

use agora_core::{Quantity, Side, TraderId};
use agora_exchange::{
    ExchangeError, ExecutionReport, MatchingEngine, Order, OrderId, OrderbookEvent, ReportKind,
};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("exchange call failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("strategy fault: {0}")]
    Fault(String),
}

/// Core trait for all trading agents
///
/// `actuate` is synchronous from the scheduler's point of view and may make
/// any number of engine calls. The report and event hooks are bookkeeping
/// only and must not block.
pub trait Agent {
    fn trader_id(&self) -> TraderId;

    /// Called once per timestep by the scheduler
    fn actuate(&mut self, engine: &mut MatchingEngine) -> Result<(), AgentError>;

    /// Called for every execution report addressed to this trader
    fn on_execution_report(&mut self, report: &ExecutionReport);

    /// Called for every public orderbook event
    fn on_public_event(&mut self, _event: &OrderbookEvent) {}

    fn cash(&self) -> f64;
}

/// State every trader carries: identity, cash, outstanding orders.
///
/// Outstanding orders are keyed by order_id; since ids are monotonic the map
/// order is also submission order.
#[derive(Debug, Clone)]
pub struct TraderState {
    pub id: TraderId,
    pub cash: f64,
    pub outstanding: BTreeMap<OrderId, Order>,
}

impl TraderState {
    pub fn new(id: TraderId, cash: f64) -> Self {
        Self {
            id,
            cash,
            outstanding: BTreeMap::new(),
        }
    }

    /// Track an accepted order that rested (has residual volume)
    pub fn track(&mut self, order: &Order) {
        if order.volume.is_positive() && order.price.is_some() {
            self.outstanding.insert(order.id, order.clone());
        }
    }

    /// Outstanding-order bookkeeping mandated for every agent:
    /// full fill removes, partial fill replaces with the smaller-volume
    /// copy, cancellation removes.
    pub fn apply_report(&mut self, report: &ExecutionReport) {
        match report.kind {
            ReportKind::FullFill | ReportKind::Cancelled => {
                self.outstanding.remove(&report.order.id);
            }
            ReportKind::PartialFill => {
                if self.outstanding.contains_key(&report.order.id) {
                    self.outstanding.insert(report.order.id, report.order.clone());
                }
            }
        }
    }

    /// Standard cash settlement: buys debit, sells credit, floored at zero.
    pub fn settle(&mut self, report: &ExecutionReport) {
        if matches!(report.kind, ReportKind::Cancelled) {
            return;
        }
        let notional = report.fill_price.to_f64() * report.fill_volume.to_f64();
        match report.order.side {
            Side::Buy => self.debit(notional),
            Side::Sell => self.credit(notional),
        }
    }

    pub fn debit(&mut self, amount: f64) {
        self.cash = (self.cash - amount).max(0.0);
    }

    pub fn credit(&mut self, amount: f64) {
        self.cash += amount;
    }

    /// Most recently submitted outstanding order
    pub fn newest(&self) -> Option<&Order> {
        self.outstanding.values().next_back()
    }

    /// Earliest outstanding order
    pub fn oldest(&self) -> Option<&Order> {
        self.outstanding.values().next()
    }
}

/// Round a float share count to a tradable quantity (at least one share).
pub(crate) fn shares(value: f64) -> Quantity {
    Quantity::new((value.round() as i64).max(1))
}

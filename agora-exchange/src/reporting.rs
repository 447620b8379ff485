//! Reporting sink contract.
//!
//! The sink is an external collaborator: the engine and scheduler push
//! analysis records at it and never look back. Implementations must be
//! best-effort — an I/O failure is theirs to log and swallow, the
//! simulation does not stop for analysis output.

use crate::order::OrderId;
use agora_core::{Price, Quantity, Side};

pub trait ReportingSink {
    /// One record per timestep: the sampled mid-price.
    fn mid_price(&mut self, timestep: u64, mid: Price);

    /// One record per transactional orderbook event: the trade price.
    fn trade(&mut self, price: Price);

    /// One record per accepted new order: its side.
    fn order_side(&mut self, side: Side);

    /// One record per aggressing market order that matched: requested
    /// volume plus the mid-price immediately before the first match and
    /// after the full sweep.
    fn price_impact(
        &mut self,
        timestep: u64,
        order_id: OrderId,
        volume: Quantity,
        mid_before: Price,
        mid_after: Price,
    );

    /// Flush any buffered output. Called at run end.
    fn flush(&mut self) {}
}

/// Sink that discards everything. Used in tests and benchmarks.
#[derive(Debug, Default)]
pub struct NullSink;

impl ReportingSink for NullSink {
    fn mid_price(&mut self, _timestep: u64, _mid: Price) {}

    fn trade(&mut self, _price: Price) {}

    fn order_side(&mut self, _side: Side) {}

    fn price_impact(
        &mut self,
        _timestep: u64,
        _order_id: OrderId,
        _volume: Quantity,
        _mid_before: Price,
        _mid_after: Price,
    ) {
    }
}

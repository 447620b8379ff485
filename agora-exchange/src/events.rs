//! Orderbook events and execution reports.
//!
//! An [`OrderbookEvent`] describes one book mutation and goes out on the
//! public feed. An [`ExecutionReport`] is the private notification routed
//! back to the order's owner.

use crate::order::{Order, OrderId};
use agora_core::{Price, Quantity, Side, TraderId};
use serde::{Deserialize, Serialize};

/// Kind of book mutation an event describes.
///
/// Fill kinds name the *resting* order's outcome, suffixed with the incoming
/// order's side: an incoming buy that wipes out a resting sell emits
/// `FullFillBuyOrder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewMarketOrder,
    NewLimitOrder,
    CancelLimitOrder,
    FullFillBuyOrder,
    FullFillSellOrder,
    PartialFillBuyOrder,
    PartialFillSellOrder,
}

impl EventKind {
    /// Fill kind for a resting order fully consumed by an incoming order of
    /// `incoming` side
    pub fn full_fill(incoming: Side) -> Self {
        match incoming {
            Side::Buy => EventKind::FullFillBuyOrder,
            Side::Sell => EventKind::FullFillSellOrder,
        }
    }

    /// Fill kind for a resting order partially consumed by an incoming order
    /// of `incoming` side
    pub fn partial_fill(incoming: Side) -> Self {
        match incoming {
            Side::Buy => EventKind::PartialFillBuyOrder,
            Side::Sell => EventKind::PartialFillSellOrder,
        }
    }

    pub fn is_fill(self) -> bool {
        matches!(
            self,
            EventKind::FullFillBuyOrder
                | EventKind::FullFillSellOrder
                | EventKind::PartialFillBuyOrder
                | EventKind::PartialFillSellOrder
        )
    }

    pub fn is_new_order(self) -> bool {
        matches!(self, EventKind::NewMarketOrder | EventKind::NewLimitOrder)
    }
}

/// One book mutation, as broadcast on the public feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderbookEvent {
    /// Strictly increasing over a run
    pub uid: u64,
    pub timestep: u64,
    /// For fills: the resting order's id (the book entry that mutated)
    pub order_id: OrderId,
    /// For fills: the resting order's owner
    pub trader: TraderId,
    pub kind: EventKind,
    /// Order volume for new/cancel events, matched quantity for fills
    pub volume: Quantity,
    /// Trade price for fills, limit price for new/cancel; ZERO for an
    /// unpriced market-order arrival
    pub price: Price,
    /// Side of the event's originating (incoming) order
    pub direction: Side,
    /// True only for fills
    pub transaction: bool,
}

/// What happened to an order, from its owner's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    FullFill,
    PartialFill,
    Cancelled,
}

/// Private notification delivered to the owning agent's mailbox.
///
/// `order` is the post-event snapshot: residual volume for a partial fill,
/// zero volume for a full fill, the removed order for a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub order: Order,
    pub kind: ReportKind,
    /// Matched quantity (the order's volume for cancellations)
    pub fill_volume: Quantity,
    /// Trade price (the order's limit price for cancellations)
    pub fill_price: Price,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_kind_carries_incoming_side() {
        assert_eq!(EventKind::full_fill(Side::Buy), EventKind::FullFillBuyOrder);
        assert_eq!(
            EventKind::partial_fill(Side::Sell),
            EventKind::PartialFillSellOrder
        );
    }

    #[test]
    fn test_classification() {
        assert!(EventKind::FullFillBuyOrder.is_fill());
        assert!(!EventKind::NewLimitOrder.is_fill());
        assert!(EventKind::NewMarketOrder.is_new_order());
        assert!(!EventKind::CancelLimitOrder.is_new_order());
    }
}

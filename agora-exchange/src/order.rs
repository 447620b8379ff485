//! Order record and id allocation.

use agora_core::{Price, Quantity, Side, Symbol, TraderId};
use serde::{Deserialize, Serialize};

/// Process-unique, monotonically increasing order identifier.
///
/// Doubles as the FIFO tie-break inside a price level: smaller id rested
/// earlier.
pub type OrderId = u64;

/// An order as acknowledged by the matching engine.
///
/// Immutable once resting, except `volume`, which holds the residual and is
/// decremented on partial fills. `price` is `None` for market orders (the
/// "market" sentinel); limit prices are already tick-rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub venue: Symbol,
    pub ticker: Symbol,
    pub trader: TraderId,
    pub side: Side,
    pub volume: Quantity,
    pub price: Option<Price>,
    /// Monotonic nanoseconds at acknowledgement
    pub acknowledged_at: u64,
}

impl Order {
    pub fn is_market(&self) -> bool {
        self.price.is_none()
    }

    /// The resting price. Panics on market orders, which never rest.
    pub(crate) fn limit_price(&self) -> Price {
        self.price.expect("resting order must carry a limit price")
    }
}

/// Allocator for monotonic order ids, starting at 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderIdGen {
    next: OrderId,
}

impl OrderIdGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    #[inline]
    pub fn allocate(&mut self) -> OrderId {
        self.next += 1;
        self.next
    }

    /// The most recently allocated id (0 if none yet)
    #[inline]
    pub fn last(&self) -> OrderId {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_monotonic_from_one() {
        let mut ids = OrderIdGen::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.last(), 2);
    }
}

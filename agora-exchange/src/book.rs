//! The limit order book.
//!
//! Both sides are `BTreeMap<Price, PriceLevel>` in natural ascending key
//! order: best bid = last key, best ask = first key. Each level is a FIFO
//! queue of resting orders (head = earliest, ids monotonic) plus a cached
//! aggregate volume. A side index order_id -> (side, price) gives O(log)
//! cancellation.

use crate::order::{Order, OrderId};
use agora_core::{Price, Quantity, Side};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// All resting orders at one price on one side.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<Order>,
    volume: Quantity,
}

impl PriceLevel {
    fn push_back(&mut self, order: Order) {
        self.volume = self.volume + order.volume;
        self.orders.push_back(order);
    }

    pub fn head(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn volume(&self) -> Quantity {
        self.volume
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

#[derive(Debug, Default)]
pub struct OrderBook {
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    index: HashMap<OrderId, (Side, Price)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&self, side: Side) -> &BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Best price on a side: highest bid, lowest ask.
    pub fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.bids.last_key_value().map(|(p, _)| *p),
            Side::Sell => self.asks.first_key_value().map(|(p, _)| *p),
        }
    }

    /// Aggregate volume at the best level (ZERO when the side is empty).
    pub fn best_volume(&self, side: Side) -> Quantity {
        let best = match side {
            Side::Buy => self.bids.last_key_value(),
            Side::Sell => self.asks.first_key_value(),
        };
        best.map(|(_, level)| level.volume()).unwrap_or(Quantity::ZERO)
    }

    /// Head (earliest-resting) order of the best level on a side.
    pub fn head(&self, side: Side) -> Option<&Order> {
        let level = match side {
            Side::Buy => self.bids.last_key_value().map(|(_, l)| l),
            Side::Sell => self.asks.first_key_value().map(|(_, l)| l),
        };
        level.and_then(PriceLevel::head)
    }

    /// Consume `qty` from the head order of the best level on `side`.
    ///
    /// Returns the post-fill snapshot of the head order and whether it was
    /// fully consumed (and therefore removed, deleting the level if it
    /// emptied). `qty` must not exceed the head's residual.
    pub fn fill_head(&mut self, side: Side, qty: Quantity) -> Option<(Order, bool)> {
        let price = self.best_price(side)?;
        let tree = self.side_mut(side);
        let level = tree.get_mut(&price)?;

        let head = level.orders.front_mut()?;
        debug_assert!(qty <= head.volume, "fill exceeds head residual");
        head.volume = head.volume - qty;
        level.volume = level.volume.saturating_sub(qty);

        let consumed = head.volume.is_zero();
        let snapshot = head.clone();

        if consumed {
            level.orders.pop_front();
            if level.is_empty() {
                tree.remove(&price);
            }
            self.index.remove(&snapshot.id);
        }

        Some((snapshot, consumed))
    }

    /// Rest a limit order at its price. The order must carry a price and a
    /// strictly positive residual.
    pub fn insert(&mut self, order: Order) {
        debug_assert!(order.volume.is_positive(), "resting residual must be positive");
        let price = order.limit_price();
        let side = order.side;
        self.index.insert(order.id, (side, price));
        self.side_mut(side).entry(price).or_default().push_back(order);
    }

    /// Remove a resting order by id. `None` if it is not in the book.
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let (side, price) = self.index.remove(&order_id)?;
        let tree = self.side_mut(side);
        let level = tree.get_mut(&price)?;
        let pos = level.orders.iter().position(|o| o.id == order_id)?;
        let order = level.orders.remove(pos)?;
        level.volume = level.volume.saturating_sub(order.volume);
        if level.is_empty() {
            tree.remove(&price);
        }
        Some(order)
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    /// (side, price) of a resting order
    pub fn locate(&self, order_id: OrderId) -> Option<(Side, Price)> {
        self.index.get(&order_id).copied()
    }

    /// Up to `n` levels from the best outward, best first.
    pub fn depth(&self, side: Side, n: usize) -> Vec<(Price, Quantity)> {
        match side {
            Side::Buy => self
                .bids
                .iter()
                .rev()
                .take(n)
                .map(|(p, l)| (*p, l.volume()))
                .collect(),
            Side::Sell => self
                .asks
                .iter()
                .take(n)
                .map(|(p, l)| (*p, l.volume()))
                .collect(),
        }
    }

    pub fn is_side_empty(&self, side: Side) -> bool {
        self.side(side).is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn level_count(&self, side: Side) -> usize {
        self.side(side).len()
    }

    /// Book invariant: not crossed whenever both sides are non-empty.
    pub fn is_crossed(&self) -> bool {
        match (self.best_price(Side::Buy), self.best_price(Side::Sell)) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }
}

/// Immutable depth snapshot, best first on both sides.
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
    pub sequence: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{Strategy, Symbol, TraderId};

    fn order(id: OrderId, side: Side, price: f64, volume: i64) -> Order {
        Order {
            id,
            venue: Symbol::new("AGORA").unwrap(),
            ticker: Symbol::new("EQ1").unwrap(),
            trader: TraderId::new(Strategy::Noise, 0),
            side,
            volume: Quantity::new(volume),
            price: Some(Price::from_f64(price)),
            acknowledged_at: id,
        }
    }

    #[test]
    fn test_best_prices() {
        let mut book = OrderBook::new();
        book.insert(order(1, Side::Buy, 99.98, 10));
        book.insert(order(2, Side::Buy, 99.99, 10));
        book.insert(order(3, Side::Sell, 100.02, 10));
        book.insert(order(4, Side::Sell, 100.01, 10));

        assert_eq!(book.best_price(Side::Buy), Some(Price::from_f64(99.99)));
        assert_eq!(book.best_price(Side::Sell), Some(Price::from_f64(100.01)));
        assert!(!book.is_crossed());
    }

    #[test]
    fn test_fifo_within_level() {
        let mut book = OrderBook::new();
        book.insert(order(1, Side::Buy, 100.00, 10));
        book.insert(order(2, Side::Buy, 100.00, 10));

        assert_eq!(book.head(Side::Buy).unwrap().id, 1);
        let (first, consumed) = book.fill_head(Side::Buy, Quantity::new(10)).unwrap();
        assert!(consumed);
        assert_eq!(first.id, 1);
        assert_eq!(book.head(Side::Buy).unwrap().id, 2);
    }

    #[test]
    fn test_partial_fill_keeps_head_position() {
        let mut book = OrderBook::new();
        book.insert(order(1, Side::Sell, 100.01, 40));
        book.insert(order(2, Side::Sell, 100.01, 40));

        let (head, consumed) = book.fill_head(Side::Sell, Quantity::new(15)).unwrap();
        assert!(!consumed);
        assert_eq!(head.id, 1);
        assert_eq!(head.volume, Quantity::new(25));
        assert_eq!(book.head(Side::Sell).unwrap().id, 1);
        assert_eq!(book.best_volume(Side::Sell), Quantity::new(65));
    }

    #[test]
    fn test_level_deleted_when_empty() {
        let mut book = OrderBook::new();
        book.insert(order(1, Side::Sell, 100.01, 40));
        book.insert(order(2, Side::Sell, 100.02, 30));

        let (_, consumed) = book.fill_head(Side::Sell, Quantity::new(40)).unwrap();
        assert!(consumed);
        assert_eq!(book.level_count(Side::Sell), 1);
        assert_eq!(book.best_price(Side::Sell), Some(Price::from_f64(100.02)));
    }

    #[test]
    fn test_remove_by_id() {
        let mut book = OrderBook::new();
        book.insert(order(7, Side::Buy, 99.95, 25));

        let removed = book.remove(7).unwrap();
        assert_eq!(removed.id, 7);
        assert!(book.is_side_empty(Side::Buy));
        assert!(book.remove(7).is_none());
    }

    #[test]
    fn test_depth_best_first() {
        let mut book = OrderBook::new();
        for (id, price) in [(1, 99.99), (2, 99.97), (3, 99.98)] {
            book.insert(order(id, Side::Buy, price, 10));
        }
        let depth = book.depth(Side::Buy, 2);
        assert_eq!(depth[0].0, Price::from_f64(99.99));
        assert_eq!(depth[1].0, Price::from_f64(99.98));
    }
}

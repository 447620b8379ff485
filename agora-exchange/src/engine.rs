//! The matching engine.
//!
//! Single writer of all book state. Submission and cancellation are
//! synchronous; orderbook events, execution reports and analysis records are
//! queued on the way out and drained by the caller between actuations.
//!
//! Matching is strict price-time priority: best level first, FIFO head first
//! within a level, trade price always the resting order's price.

use crate::book::{BookSnapshot, OrderBook};
use crate::clock::SimClock;
use crate::error::{ExchangeError, Result};
use crate::events::{EventKind, ExecutionReport, OrderbookEvent, ReportKind};
use crate::feed::PublicFeed;
use crate::order::{Order, OrderId, OrderIdGen};
use crate::reporting::ReportingSink;
use agora_core::{Price, Quantity, Side, Symbol, TraderId};
use std::collections::VecDeque;
use tracing::trace;

/// Levels returned by the best-N quote queries
pub const QUOTE_DEPTH: usize = 5;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub venue: Symbol,
    pub ticker: Symbol,
    pub tick_size: Price,
    /// Seeds `last_price` before the first trade
    pub initial_last_price: Price,
    /// Seeds `last_size` before the first trade
    pub initial_last_size: Quantity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            venue: Symbol::new("AGORA").expect("static symbol"),
            ticker: Symbol::new("EQ1").expect("static symbol"),
            tick_size: Price::from_raw(100), // 0.01
            initial_last_price: Price::from_int(100),
            initial_last_size: Quantity::ONE,
        }
    }
}

pub struct MatchingEngine {
    config: EngineConfig,
    book: OrderBook,
    ids: OrderIdGen,
    clock: SimClock,
    event_uid: u64,
    timestep: u64,
    last_price: Price,
    last_size: Quantity,
    feed: PublicFeed,
    reports: VecDeque<(TraderId, ExecutionReport)>,
    sink: Box<dyn ReportingSink>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig, sink: Box<dyn ReportingSink>) -> Self {
        Self {
            last_price: config.initial_last_price,
            last_size: config.initial_last_size,
            config,
            book: OrderBook::new(),
            ids: OrderIdGen::new(),
            clock: SimClock::new(),
            event_uid: 0,
            timestep: 0,
            feed: PublicFeed::new(),
            reports: VecDeque::new(),
            sink,
        }
    }

    // --- quote surface -----------------------------------------------------

    pub fn tick_size(&self) -> Price {
        self.config.tick_size
    }

    pub fn venue(&self) -> &Symbol {
        &self.config.venue
    }

    pub fn ticker(&self) -> &Symbol {
        &self.config.ticker
    }

    /// Best bid, ZERO when the bid side is empty
    pub fn bid_price(&self) -> Price {
        self.book.best_price(Side::Buy).unwrap_or(Price::ZERO)
    }

    /// Best ask, ZERO when the ask side is empty
    pub fn ask_price(&self) -> Price {
        self.book.best_price(Side::Sell).unwrap_or(Price::ZERO)
    }

    /// (best_bid + best_ask) / 2, absent sides contributing zero
    pub fn mid_price(&self) -> Price {
        self.bid_price().midpoint(self.ask_price())
    }

    pub fn bid_size(&self) -> Quantity {
        self.book.best_volume(Side::Buy)
    }

    pub fn ask_size(&self) -> Quantity {
        self.book.best_volume(Side::Sell)
    }

    /// Up to five best bid prices, furthest (worst) first
    pub fn highest_bid_prices(&self) -> Vec<Price> {
        let mut prices: Vec<Price> = self
            .book
            .depth(Side::Buy, QUOTE_DEPTH)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        prices.reverse();
        prices
    }

    /// Aggregate volumes aligned with [`Self::highest_bid_prices`]
    pub fn highest_bid_sizes(&self) -> Vec<Quantity> {
        let mut sizes: Vec<Quantity> = self
            .book
            .depth(Side::Buy, QUOTE_DEPTH)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        sizes.reverse();
        sizes
    }

    /// Up to five best ask prices, furthest (worst) first
    pub fn lowest_ask_prices(&self) -> Vec<Price> {
        let mut prices: Vec<Price> = self
            .book
            .depth(Side::Sell, QUOTE_DEPTH)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        prices.reverse();
        prices
    }

    /// Aggregate volumes aligned with [`Self::lowest_ask_prices`]
    pub fn lowest_ask_sizes(&self) -> Vec<Quantity> {
        let mut sizes: Vec<Quantity> = self
            .book
            .depth(Side::Sell, QUOTE_DEPTH)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        sizes.reverse();
        sizes
    }

    /// Price of the last executed trade (seeded from configuration)
    pub fn last_price(&self) -> Price {
        self.last_price
    }

    /// Volume of the last executed trade (seeded from configuration)
    pub fn last_size(&self) -> Quantity {
        self.last_size
    }

    pub fn is_side_empty(&self, side: Side) -> bool {
        self.book.is_side_empty(side)
    }

    pub fn order_count(&self) -> usize {
        self.book.order_count()
    }

    /// Event uids handed out so far (strictly increasing over a run)
    pub fn events_emitted(&self) -> u64 {
        self.event_uid
    }

    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            bids: self.book.depth(Side::Buy, depth),
            asks: self.book.depth(Side::Sell, depth),
            sequence: self.event_uid,
        }
    }

    // --- timestep plumbing -------------------------------------------------

    pub fn set_timestep(&mut self, timestep: u64) {
        self.timestep = timestep;
    }

    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Sample the current mid-price into the reporting sink. Called by the
    /// scheduler once per timestep.
    pub fn record_mid_price(&mut self) {
        let mid = self.mid_price();
        self.sink.mid_price(self.timestep, mid);
    }

    /// Flush the reporting sink (run end).
    pub fn flush_sink(&mut self) {
        self.sink.flush();
    }

    /// Take all pending public-feed events, production order.
    pub fn drain_feed(&mut self) -> Vec<OrderbookEvent> {
        self.feed.drain()
    }

    /// Take all pending execution reports, emission order.
    pub fn drain_reports(&mut self) -> Vec<(TraderId, ExecutionReport)> {
        self.reports.drain(..).collect()
    }

    // --- order entry -------------------------------------------------------

    pub fn buy_market_order(&mut self, trader: TraderId, volume: Quantity) -> Result<Order> {
        self.submit_market(trader, Side::Buy, volume)
    }

    pub fn sell_market_order(&mut self, trader: TraderId, volume: Quantity) -> Result<Order> {
        self.submit_market(trader, Side::Sell, volume)
    }

    pub fn buy_limit_order(
        &mut self,
        trader: TraderId,
        price: Price,
        volume: Quantity,
    ) -> Result<Order> {
        self.submit_limit(trader, Side::Buy, price, volume)
    }

    pub fn sell_limit_order(
        &mut self,
        trader: TraderId,
        price: Price,
        volume: Quantity,
    ) -> Result<Order> {
        self.submit_limit(trader, Side::Sell, price, volume)
    }

    /// Cancel a resting order.
    ///
    /// Idempotent: an order already filled or cancelled is a successful
    /// no-op. Returns whether an order was actually removed.
    pub fn cancel_order(&mut self, order: &Order) -> bool {
        let Some(removed) = self.book.remove(order.id) else {
            trace!(order_id = order.id, "cancel of absent order (no-op)");
            return false;
        };

        let price = removed.limit_price();
        self.emit(
            removed.id,
            removed.trader,
            EventKind::CancelLimitOrder,
            removed.volume,
            price,
            removed.side,
        );
        self.report(
            removed.trader,
            ExecutionReport {
                kind: ReportKind::Cancelled,
                fill_volume: removed.volume,
                fill_price: price,
                order: removed,
            },
        );
        true
    }

    fn submit_market(&mut self, trader: TraderId, side: Side, volume: Quantity) -> Result<Order> {
        if !volume.is_positive() {
            return Err(ExchangeError::NonPositiveVolume(volume));
        }

        let mut order = self.accept(trader, side, volume, None);
        self.emit(
            order.id,
            trader,
            EventKind::NewMarketOrder,
            volume,
            Price::ZERO,
            side,
        );

        let mid_before = self.mid_price();
        let matched = self.sweep(&mut order, None);

        if matched.is_positive() {
            let mid_after = self.mid_price();
            self.sink
                .price_impact(self.timestep, order.id, volume, mid_before, mid_after);
        }

        // Unfilled remainder of a market order is discarded, never rested
        debug_assert!(!self.book.is_crossed(), "book crossed after market order");
        Ok(order)
    }

    fn submit_limit(
        &mut self,
        trader: TraderId,
        side: Side,
        price: Price,
        volume: Quantity,
    ) -> Result<Order> {
        if !volume.is_positive() {
            return Err(ExchangeError::NonPositiveVolume(volume));
        }
        let rounded = price.round_to_tick(self.config.tick_size);
        if !rounded.is_positive() {
            return Err(ExchangeError::NonPositivePrice(rounded));
        }

        let mut order = self.accept(trader, side, volume, Some(rounded));
        self.emit(
            order.id,
            trader,
            EventKind::NewLimitOrder,
            volume,
            rounded,
            side,
        );

        self.sweep(&mut order, Some(rounded));

        if order.volume.is_positive() {
            self.book.insert(order.clone());
        }

        debug_assert!(!self.book.is_crossed(), "book crossed after limit order");
        Ok(order)
    }

    fn accept(
        &mut self,
        trader: TraderId,
        side: Side,
        volume: Quantity,
        price: Option<Price>,
    ) -> Order {
        Order {
            id: self.ids.allocate(),
            venue: self.config.venue.clone(),
            ticker: self.config.ticker.clone(),
            trader,
            side,
            volume,
            price,
            acknowledged_at: self.clock.next(),
        }
    }

    /// Consume opposing liquidity under price-time priority.
    ///
    /// `limit` bounds the levels stepped through (None = sweep to exhaustion,
    /// i.e. a market order). Returns the total matched quantity; the incoming
    /// order's residual is left in `order.volume`.
    fn sweep(&mut self, order: &mut Order, limit: Option<Price>) -> Quantity {
        let book_side = order.side.opposite();
        let mut matched = Quantity::ZERO;

        while order.volume.is_positive() {
            let Some(level_price) = self.book.best_price(book_side) else {
                break;
            };
            if let Some(limit) = limit {
                let matchable = match order.side {
                    Side::Buy => level_price <= limit,
                    Side::Sell => level_price >= limit,
                };
                if !matchable {
                    break;
                }
            }

            let head_volume = self
                .book
                .head(book_side)
                .map(|o| o.volume)
                .expect("non-empty level has a head");
            let q = order.volume.min(head_volume);

            let (resting, consumed) = self
                .book
                .fill_head(book_side, q)
                .expect("best level exists");
            order.volume = order.volume - q;
            matched = matched + q;

            // Trade price is always the resting order's price
            self.last_price = level_price;
            self.last_size = q;

            let kind = if consumed {
                EventKind::full_fill(order.side)
            } else {
                EventKind::partial_fill(order.side)
            };
            self.emit(resting.id, resting.trader, kind, q, level_price, order.side);

            let aggressor_kind = if order.volume.is_zero() {
                ReportKind::FullFill
            } else {
                ReportKind::PartialFill
            };
            let resting_kind = if consumed {
                ReportKind::FullFill
            } else {
                ReportKind::PartialFill
            };
            self.report(
                order.trader,
                ExecutionReport {
                    order: order.clone(),
                    kind: aggressor_kind,
                    fill_volume: q,
                    fill_price: level_price,
                },
            );
            self.report(
                resting.trader,
                ExecutionReport {
                    order: resting,
                    kind: resting_kind,
                    fill_volume: q,
                    fill_price: level_price,
                },
            );
        }

        matched
    }

    fn emit(
        &mut self,
        order_id: OrderId,
        trader: TraderId,
        kind: EventKind,
        volume: Quantity,
        price: Price,
        direction: Side,
    ) {
        self.event_uid += 1;
        let event = OrderbookEvent {
            uid: self.event_uid,
            timestep: self.timestep,
            order_id,
            trader,
            kind,
            volume,
            price,
            direction,
            transaction: kind.is_fill(),
        };

        if kind.is_fill() {
            self.sink.trade(price);
        } else if kind.is_new_order() {
            self.sink.order_side(direction);
        }

        self.feed.publish(event);
    }

    fn report(&mut self, trader: TraderId, report: ExecutionReport) {
        self.reports.push_back((trader, report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::NullSink;
    use agora_core::Strategy;

    fn engine() -> MatchingEngine {
        MatchingEngine::new(EngineConfig::default(), Box::new(NullSink))
    }

    fn t(n: u32) -> TraderId {
        TraderId::new(Strategy::Noise, n)
    }

    fn price(p: f64) -> Price {
        Price::from_f64(p)
    }

    fn qty(v: i64) -> Quantity {
        Quantity::new(v)
    }

    #[test]
    fn test_empty_book_limit_insertion() {
        let mut engine = engine();
        let order = engine.buy_limit_order(t(1), price(99.99), qty(100)).unwrap();

        assert_eq!(order.volume, qty(100));
        assert_eq!(engine.bid_price(), price(99.99));
        assert_eq!(engine.bid_size(), qty(100));
        assert!(engine.is_side_empty(Side::Sell));

        let events = engine.drain_feed();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::NewLimitOrder);
        assert!(!events[0].transaction);
    }

    #[test]
    fn test_crossing_market_buy_full_fill() {
        let mut engine = engine();
        let resting = engine
            .sell_limit_order(t(2), price(100.01), qty(100))
            .unwrap();
        engine.drain_feed();
        engine.drain_reports();

        let order = engine.buy_market_order(t(1), qty(100)).unwrap();
        assert!(order.volume.is_zero());
        assert!(engine.is_side_empty(Side::Sell));
        assert_eq!(engine.last_price(), price(100.01));
        assert_eq!(engine.last_size(), qty(100));

        let events = engine.drain_feed();
        let fill = events.iter().find(|e| e.transaction).unwrap();
        assert_eq!(fill.kind, EventKind::FullFillBuyOrder);
        assert_eq!(fill.order_id, resting.id);
        assert_eq!(fill.price, price(100.01));
        assert_eq!(fill.direction, Side::Buy);

        let reports = engine.drain_reports();
        assert_eq!(reports.len(), 2);
        assert!(reports
            .iter()
            .all(|(_, r)| r.kind == ReportKind::FullFill && r.fill_price == price(100.01)));
        assert!(reports.iter().any(|(owner, _)| *owner == t(1)));
        assert!(reports.iter().any(|(owner, _)| *owner == t(2)));
    }

    #[test]
    fn test_partial_fill_then_rest() {
        let mut engine = engine();
        engine.sell_limit_order(t(2), price(100.01), qty(40)).unwrap();
        engine.sell_limit_order(t(2), price(100.02), qty(30)).unwrap();
        engine.drain_feed();
        engine.drain_reports();

        let order = engine.buy_limit_order(t(1), price(100.01), qty(100)).unwrap();

        // 40 filled at 100.01, remaining 60 rests as the new best bid
        assert_eq!(order.volume, qty(60));
        assert_eq!(engine.bid_price(), price(100.01));
        assert_eq!(engine.bid_size(), qty(60));
        assert_eq!(engine.ask_price(), price(100.02));
        assert_eq!(engine.ask_size(), qty(30));

        let events = engine.drain_feed();
        assert_eq!(events.len(), 2); // new_limit_order + one full-fill
        assert_eq!(events[0].kind, EventKind::NewLimitOrder);
        assert_eq!(events[1].kind, EventKind::FullFillBuyOrder);
        assert_eq!(events[1].volume, qty(40));

        let reports = engine.drain_reports();
        let (_, aggressor) = reports.iter().find(|(owner, _)| *owner == t(1)).unwrap();
        assert_eq!(aggressor.kind, ReportKind::PartialFill);
        assert_eq!(aggressor.order.volume, qty(60));
        let (_, resting) = reports.iter().find(|(owner, _)| *owner == t(2)).unwrap();
        assert_eq!(resting.kind, ReportKind::FullFill);
    }

    #[test]
    fn test_fifo_at_price_level() {
        let mut engine = engine();
        let o1 = engine.buy_limit_order(t(1), price(100.00), qty(10)).unwrap();
        let o2 = engine.buy_limit_order(t(2), price(100.00), qty(10)).unwrap();
        engine.drain_feed();
        engine.drain_reports();

        engine.sell_market_order(t(3), qty(15)).unwrap();

        assert_eq!(engine.bid_size(), qty(5));
        let reports = engine.drain_reports();
        let o1_report = reports
            .iter()
            .find(|(_, r)| r.order.id == o1.id)
            .map(|(_, r)| r)
            .unwrap();
        assert_eq!(o1_report.kind, ReportKind::FullFill);
        assert_eq!(o1_report.fill_volume, qty(10));

        let o2_report = reports
            .iter()
            .find(|(_, r)| r.order.id == o2.id)
            .map(|(_, r)| r)
            .unwrap();
        assert_eq!(o2_report.kind, ReportKind::PartialFill);
        assert_eq!(o2_report.fill_volume, qty(5));
        assert_eq!(o2_report.order.volume, qty(5));
    }

    #[test]
    fn test_cancellation_idempotent() {
        let mut engine = engine();
        let order = engine
            .sell_limit_order(t(1), price(100.50), qty(25))
            .unwrap();
        engine.drain_feed();

        assert!(engine.cancel_order(&order));
        assert!(engine.is_side_empty(Side::Sell));

        let events = engine.drain_feed();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::CancelLimitOrder);
        assert_eq!(events[0].volume, qty(25));

        let reports = engine.drain_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].1.kind, ReportKind::Cancelled);

        // Second cancel: success, no further event
        assert!(!engine.cancel_order(&order));
        assert!(engine.drain_feed().is_empty());
        assert!(engine.drain_reports().is_empty());
    }

    #[test]
    fn test_market_order_on_empty_book_is_discarded() {
        let mut engine = engine();
        let order = engine.buy_market_order(t(1), qty(50)).unwrap();
        assert_eq!(order.volume, qty(50));
        assert_eq!(engine.order_count(), 0);

        // Arrival is still announced
        let events = engine.drain_feed();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::NewMarketOrder);
        assert_eq!(events[0].price, Price::ZERO);
    }

    #[test]
    fn test_market_order_sweeps_levels() {
        let mut engine = engine();
        engine.sell_limit_order(t(2), price(100.01), qty(40)).unwrap();
        engine.sell_limit_order(t(2), price(100.02), qty(30)).unwrap();
        engine.sell_limit_order(t(2), price(100.03), qty(30)).unwrap();
        engine.drain_feed();
        engine.drain_reports();

        let order = engine.buy_market_order(t(1), qty(90)).unwrap();
        assert!(order.volume.is_zero());
        assert_eq!(engine.ask_price(), price(100.03));
        assert_eq!(engine.ask_size(), qty(10));
        assert_eq!(engine.last_price(), price(100.03));
        assert_eq!(engine.last_size(), qty(20));
    }

    #[test]
    fn test_rejection_is_side_effect_free() {
        let mut engine = engine();
        engine.buy_limit_order(t(1), price(99.99), qty(10)).unwrap();
        engine.drain_feed();
        let events_before = engine.events_emitted();

        assert!(matches!(
            engine.buy_limit_order(t(1), price(100.00), qty(0)),
            Err(ExchangeError::NonPositiveVolume(_))
        ));
        assert!(matches!(
            engine.sell_limit_order(t(1), price(0.004), qty(10)),
            Err(ExchangeError::NonPositivePrice(_))
        ));
        assert!(matches!(
            engine.buy_market_order(t(1), qty(-5)),
            Err(ExchangeError::NonPositiveVolume(_))
        ));

        assert_eq!(engine.events_emitted(), events_before);
        assert_eq!(engine.order_count(), 1);
        assert!(engine.drain_feed().is_empty());
        assert!(engine.drain_reports().is_empty());
    }

    #[test]
    fn test_limit_price_rounded_half_down() {
        let mut engine = engine();
        let order = engine
            .buy_limit_order(t(1), Price::from_f64(99.995), qty(10))
            .unwrap();
        assert_eq!(order.price, Some(price(99.99)));
        assert_eq!(engine.bid_price(), price(99.99));
    }

    #[test]
    fn test_best_n_queries_outward_ordered() {
        let mut engine = engine();
        for (p, v) in [(99.99, 10), (99.98, 20), (99.97, 30)] {
            engine.buy_limit_order(t(1), price(p), qty(v)).unwrap();
        }
        for (p, v) in [(100.01, 15), (100.02, 25)] {
            engine.sell_limit_order(t(1), price(p), qty(v)).unwrap();
        }

        assert_eq!(
            engine.highest_bid_prices(),
            vec![price(99.97), price(99.98), price(99.99)]
        );
        assert_eq!(
            engine.highest_bid_sizes(),
            vec![qty(30), qty(20), qty(10)]
        );
        assert_eq!(
            engine.lowest_ask_prices(),
            vec![price(100.02), price(100.01)]
        );
        assert_eq!(engine.lowest_ask_sizes(), vec![qty(25), qty(15)]);
    }

    #[test]
    fn test_event_uids_strictly_increasing() {
        let mut engine = engine();
        engine.buy_limit_order(t(1), price(99.99), qty(10)).unwrap();
        engine.sell_limit_order(t(2), price(99.99), qty(10)).unwrap();
        engine.buy_limit_order(t(1), price(99.98), qty(5)).unwrap();

        let events = engine.drain_feed();
        for pair in events.windows(2) {
            assert!(pair[0].uid < pair[1].uid);
        }
    }

    #[test]
    fn test_mid_price_half_tick() {
        let mut engine = engine();
        engine.buy_limit_order(t(1), price(100.00), qty(10)).unwrap();
        engine.sell_limit_order(t(2), price(100.01), qty(10)).unwrap();
        assert_eq!(engine.mid_price(), Price::from_raw(1_000_050));
    }
}

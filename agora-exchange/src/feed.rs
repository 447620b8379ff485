//! Public market-data feed.
//!
//! A single fan-out channel on the "orderbook_event" topic. The engine
//! appends, never blocks; the scheduler drains the pending queue and hands
//! each batch to every subscriber in production order, which preserves
//! per-subscriber ordering. Subscribers are advisory only.

use crate::events::OrderbookEvent;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct PublicFeed {
    pending: VecDeque<OrderbookEvent>,
    published: u64,
}

impl PublicFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Non-blocking by construction.
    #[inline]
    pub fn publish(&mut self, event: OrderbookEvent) {
        self.published += 1;
        self.pending.push_back(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<OrderbookEvent> {
        self.pending.drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Total events published over the feed's lifetime
    pub fn published(&self) -> u64 {
        self.published
    }
}

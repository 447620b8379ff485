//! Limit order book, matching engine and market-data plumbing.
//!
//! The [`MatchingEngine`] is the only writer of book state. Agents call into
//! it synchronously; everything flowing back out (orderbook events on the
//! [`PublicFeed`], execution reports in the report mailbox, analysis records
//! on the [`ReportingSink`]) is queued and delivered between actuations, so a
//! misbehaving consumer can never abort matching.

mod book;
mod clock;
mod engine;
mod error;
mod events;
mod feed;
mod order;
mod reporting;

pub use book::{BookSnapshot, OrderBook, PriceLevel};
pub use clock::SimClock;
pub use engine::{EngineConfig, MatchingEngine, QUOTE_DEPTH};
pub use error::{ExchangeError, Result};
pub use events::{EventKind, ExecutionReport, OrderbookEvent, ReportKind};
pub use feed::PublicFeed;
pub use order::{Order, OrderId, OrderIdGen};
pub use reporting::{NullSink, ReportingSink};

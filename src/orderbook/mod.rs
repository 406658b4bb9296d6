//! Per-commodity order book: placement, matching, and snapshotting (C2, C3).

mod book;
mod matching;
mod snapshot;

pub use book::{LevelEntries, OrderBook};
pub use matching::{match_incoming, peek_fillable};
pub use snapshot::{AggregatedLevel, OrderBookSnapshot, snapshot};

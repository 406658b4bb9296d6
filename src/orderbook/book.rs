//! Per-commodity limit order book: two price-time-priority ladders (§3,
//! §4.1). A single `OrderBook` only tracks *placement* — which order ids
//! rest at which price, in which queue position. The orders themselves
//! (quantity, status, fills) live in the engine's master order map; the
//! book stores only ids plus the `created_at` needed to keep queue order,
//! mirroring the "cyclic references resolved by storing ids only" design
//! note (§9).

use crate::domain::{Commodity, OrderId, Side};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::trace;

/// One resting order's queue position bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BookEntry {
    order_id: OrderId,
    created_at: i64,
}

fn insertion_index(level: &[BookEntry], entry: &BookEntry) -> usize {
    // Sorted by created_at ascending, ties broken by order id ascending
    // (§4.2: "any stable rule acceptable, must be deterministic").
    level
        .binary_search_by(|e| {
            (e.created_at, e.order_id).cmp(&(entry.created_at, entry.order_id))
        })
        .unwrap_or_else(|insert_at| insert_at)
}

/// One price level's resting order ids, in time priority, for snapshotting.
pub struct LevelEntries {
    pub price: Decimal,
    pub order_ids: Vec<OrderId>,
}

/// The order book for a single commodity. All mutation must happen while
/// the owning per-commodity lock is held (§5) — this type itself performs
/// no locking of its own.
pub struct OrderBook {
    commodity: Commodity,
    bids: BTreeMap<Decimal, Vec<BookEntry>>,
    asks: BTreeMap<Decimal, Vec<BookEntry>>,
    locations: std::collections::HashMap<OrderId, (Decimal, Side)>,
}

impl OrderBook {
    pub fn new(commodity: Commodity) -> Self {
        Self {
            commodity,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            locations: std::collections::HashMap::new(),
        }
    }

    pub fn commodity(&self) -> Commodity {
        self.commodity
    }

    fn side_map(&mut self, side: Side) -> &mut BTreeMap<Decimal, Vec<BookEntry>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Places a resting limit order at the queue position its `created_at`
    /// dictates (§4.1). A limit order appears in exactly one side, at most
    /// once (§3).
    pub fn insert(&mut self, order_id: OrderId, side: Side, price: Decimal, created_at: i64) {
        let entry = BookEntry {
            order_id,
            created_at,
        };
        let level = self.side_map(side).entry(price).or_default();
        let at = insertion_index(level, &entry);
        level.insert(at, entry);
        self.locations.insert(order_id, (price, side));
        trace!(%order_id, %price, ?side, "order inserted into book");
    }

    /// Removes `order_id` from the book. A no-op if the id is absent
    /// (§4.1: "remove is idempotent").
    pub fn remove(&mut self, order_id: OrderId) -> bool {
        let Some((price, side)) = self.locations.remove(&order_id) else {
            return false;
        };
        let map = self.side_map(side);
        if let Some(level) = map.get_mut(&price) {
            level.retain(|e| e.order_id != order_id);
            if level.is_empty() {
                map.remove(&price);
            }
        }
        trace!(%order_id, "order removed from book");
        true
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.locations.contains_key(&order_id)
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// The first (earliest-priority) resting order id at the best price on
    /// `side`, used by the matching engine as the next passive fill
    /// candidate.
    pub fn best_on_side(&self, side: Side) -> Option<(Decimal, OrderId)> {
        let map = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        let (price, level) = match side {
            // Bids are matched best-first, i.e. highest price first.
            Side::Buy => map.iter().next_back()?,
            Side::Sell => map.iter().next()?,
        };
        level.first().map(|e| (*price, e.order_id))
    }

    /// Price levels on `side` in match order (best price first, i.e.
    /// descending for bids, ascending for asks), each with its resting
    /// order ids in time priority — the shape `snapshot(depth)` aggregates
    /// (§4.1).
    pub fn levels(&self, side: Side) -> Vec<LevelEntries> {
        let to_level = |(price, entries): (&Decimal, &Vec<BookEntry>)| LevelEntries {
            price: *price,
            order_ids: entries.iter().map(|e| e.order_id).collect(),
        };
        match side {
            Side::Buy => self.bids.iter().rev().map(to_level).collect(),
            Side::Sell => self.asks.iter().map(to_level).collect(),
        }
    }

    /// Total number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn oid() -> OrderId {
        Uuid::new_v4()
    }

    #[test]
    fn insert_then_remove_is_idempotent() {
        let mut book = OrderBook::new(Commodity::CrudeOil);
        let id = oid();
        book.insert(id, Side::Buy, Decimal::from(80), 1);
        assert!(book.contains(id));
        assert!(book.remove(id));
        assert!(!book.contains(id));
        // Removing again is a no-op, not an error.
        assert!(!book.remove(id));
    }

    #[test]
    fn best_bid_and_ask_track_extremes() {
        let mut book = OrderBook::new(Commodity::CrudeOil);
        book.insert(oid(), Side::Buy, Decimal::from(79), 1);
        book.insert(oid(), Side::Buy, Decimal::from(80), 2);
        book.insert(oid(), Side::Sell, Decimal::from(82), 3);
        book.insert(oid(), Side::Sell, Decimal::from(81), 4);

        assert_eq!(book.best_bid(), Some(Decimal::from(80)));
        assert_eq!(book.best_ask(), Some(Decimal::from(81)));
    }

    #[test]
    fn same_price_orders_are_time_ordered() {
        let mut book = OrderBook::new(Commodity::CrudeOil);
        let first = oid();
        let second = oid();
        book.insert(first, Side::Buy, Decimal::from(80), 100);
        book.insert(second, Side::Buy, Decimal::from(80), 50);

        // `second` was created earlier (lower created_at) so it is first
        // in queue despite being inserted after `first`.
        let (_, next) = book.best_on_side(Side::Buy).unwrap();
        assert_eq!(next, second);
    }

    #[test]
    fn levels_aggregate_in_match_order() {
        let mut book = OrderBook::new(Commodity::CrudeOil);
        book.insert(oid(), Side::Buy, Decimal::from(79), 1);
        book.insert(oid(), Side::Buy, Decimal::from(80), 2);
        let levels = book.levels(Side::Buy);
        assert_eq!(levels[0].price, Decimal::from(80));
        assert_eq!(levels[1].price, Decimal::from(79));
    }
}

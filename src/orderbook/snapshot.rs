//! Aggregated order book snapshots for market data consumers (§4.1, §6).

use super::book::OrderBook;
use crate::domain::{Commodity, Order, Side};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One aggregated price level: all resting orders at `price` collapsed
/// into a summed quantity and a count (§4.1: "Snapshots aggregate orders
/// at identical prices into one level").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedLevel {
    pub price: Decimal,
    pub quantity: Decimal,
    pub order_count: usize,
}

/// A depth-limited, JSON-compatible snapshot of one commodity's book (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub commodity: Commodity,
    pub bids: Vec<AggregatedLevel>,
    pub asks: Vec<AggregatedLevel>,
}

/// Builds a snapshot of `book` limited to `depth` levels per side. Needs
/// the master order map to recover each resting order's remaining
/// quantity, since the book itself only tracks placement (§9).
pub fn snapshot(book: &OrderBook, orders: &DashMap<Uuid, Order>, depth: usize) -> OrderBookSnapshot {
    let aggregate = |side: Side| -> Vec<AggregatedLevel> {
        book.levels(side)
            .into_iter()
            .take(depth)
            .map(|level| {
                let quantity = level
                    .order_ids
                    .iter()
                    .filter_map(|id| orders.get(id).map(|o| o.remaining_quantity))
                    .sum();
                AggregatedLevel {
                    price: level.price,
                    quantity,
                    order_count: level.order_ids.len(),
                }
            })
            .collect()
    };

    OrderBookSnapshot {
        commodity: book.commodity(),
        bids: aggregate(Side::Buy),
        asks: aggregate(Side::Sell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderKind, OrderStatus, TimeInForce, UserId};
    use rust_decimal_macros::dec;

    fn order(id: Uuid, price: Decimal, qty: Decimal, created_at: i64) -> Order {
        Order {
            id,
            user_id: UserId::new_v4(),
            commodity: Commodity::CrudeOil,
            side: Side::Buy,
            kind: OrderKind::Limit,
            quantity: qty,
            limit_price: Some(price),
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
            created_at,
            updated_at: created_at,
            status: OrderStatus::Pending,
            filled_quantity: Decimal::ZERO,
            remaining_quantity: qty,
            avg_fill_price: Decimal::ZERO,
            fill_ids: Vec::new(),
        }
    }

    #[test]
    fn aggregates_same_price_orders_into_one_level() {
        let mut book = OrderBook::new(Commodity::CrudeOil);
        let orders: DashMap<Uuid, Order> = DashMap::new();

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        orders.insert(a, order(a, dec!(80), dec!(100), 1));
        orders.insert(b, order(b, dec!(80), dec!(50), 2));
        book.insert(a, Side::Buy, dec!(80), 1);
        book.insert(b, Side::Buy, dec!(80), 2);

        let snap = snapshot(&book, &orders, 10);
        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.bids[0].quantity, dec!(150));
        assert_eq!(snap.bids[0].order_count, 2);
    }

    #[test]
    fn depth_limits_levels_returned() {
        let mut book = OrderBook::new(Commodity::CrudeOil);
        let orders: DashMap<Uuid, Order> = DashMap::new();
        for (i, price) in [dec!(78), dec!(79), dec!(80)].into_iter().enumerate() {
            let id = Uuid::new_v4();
            orders.insert(id, order(id, price, dec!(10), i as i64));
            book.insert(id, Side::Buy, price, i as i64);
        }

        let snap = snapshot(&book, &orders, 2);
        assert_eq!(snap.bids.len(), 2);
        assert_eq!(snap.bids[0].price, dec!(80));
    }
}

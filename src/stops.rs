//! Stop and stop-limit trigger tracking (§4.2). Stop and stop-limit orders
//! never rest in [`crate::orderbook::OrderBook`] directly; they sit here
//! until the commodity's reference price trades through their trigger,
//! at which point `OrderManager` promotes them to a live market order
//! (plain stop) or limit order (stop-limit) and hands them to
//! [`crate::orderbook::match_incoming`].
//!
//! Resolved open question: the trigger reference price is the commodity's
//! own last trade price; until a commodity has traded at least once, the
//! Market Price Oracle's price stands in (§9).

use crate::domain::{Commodity, Order, OrderId, OrderKind, Side};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::trace;

/// Whether `reference_price` has crossed `stop_price` for a stop order
/// resting on `side` (§4.2): a buy-side stop triggers on the way up, a
/// sell-side stop triggers on the way down.
fn has_triggered(side: Side, stop_price: Decimal, reference_price: Decimal) -> bool {
    match side {
        Side::Buy => reference_price >= stop_price,
        Side::Sell => reference_price <= stop_price,
    }
}

/// Tracks pending stop/stop-limit orders per commodity, outside the
/// regular price-time book.
#[derive(Default)]
pub struct StopBook {
    pending: DashMap<Commodity, Vec<OrderId>>,
}

impl StopBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `order_id` as a pending stop trigger for `commodity`.
    /// Callers must only register orders of kind `Stop` or `StopLimit`
    /// (§3); this type does not itself validate the order kind.
    pub fn add(&self, commodity: Commodity, order_id: OrderId) {
        self.pending.entry(commodity).or_default().push(order_id);
        trace!(%order_id, %commodity, "stop order armed");
    }

    /// Removes `order_id` from the pending set, e.g. on cancel. A no-op if
    /// the id is not pending (§4.1 idempotent-remove convention).
    pub fn remove(&self, commodity: Commodity, order_id: OrderId) -> bool {
        let Some(mut entries) = self.pending.get_mut(&commodity) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|id| *id != order_id);
        before != entries.len()
    }

    /// Returns the ids of every pending stop/stop-limit order on
    /// `commodity` whose trigger condition `reference_price` satisfies,
    /// removing them from the pending set. Looks each id up in `orders` to
    /// read its side and stop price; an id with no corresponding order (a
    /// race with cancellation) is dropped silently.
    pub fn triggered(
        &self,
        commodity: Commodity,
        reference_price: Decimal,
        orders: &DashMap<OrderId, Order>,
    ) -> Vec<OrderId> {
        let Some(mut entries) = self.pending.get_mut(&commodity) else {
            return Vec::new();
        };

        let mut fired = Vec::new();
        entries.retain(|id| {
            let Some(order) = orders.get(id) else {
                return false;
            };
            let Some(stop_price) = order.stop_price else {
                return false;
            };
            debug_assert!(matches!(order.kind, OrderKind::Stop | OrderKind::StopLimit));
            if has_triggered(order.side, stop_price, reference_price) {
                fired.push(*id);
                false
            } else {
                true
            }
        });

        if !fired.is_empty() {
            trace!(%commodity, %reference_price, count = fired.len(), "stop orders triggered");
        }
        fired
    }

    /// Number of orders currently pending trigger on `commodity`.
    pub fn pending_count(&self, commodity: Commodity) -> usize {
        self.pending.get(&commodity).map(|v| v.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderStatus, TimeInForce, UserId};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn stop_order(side: Side, stop_price: Decimal) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: UserId::new_v4(),
            commodity: Commodity::CrudeOil,
            side,
            kind: OrderKind::Stop,
            quantity: dec!(10),
            limit_price: None,
            stop_price: Some(stop_price),
            time_in_force: TimeInForce::Gtc,
            created_at: 0,
            updated_at: 0,
            status: OrderStatus::Pending,
            filled_quantity: Decimal::ZERO,
            remaining_quantity: dec!(10),
            avg_fill_price: Decimal::ZERO,
            fill_ids: Vec::new(),
        }
    }

    #[test]
    fn buy_stop_triggers_on_rising_price() {
        let stops = StopBook::new();
        let orders: DashMap<OrderId, Order> = DashMap::new();
        let order = stop_order(Side::Buy, dec!(85));
        let id = order.id;
        orders.insert(id, order);
        stops.add(Commodity::CrudeOil, id);

        assert!(stops.triggered(Commodity::CrudeOil, dec!(84), &orders).is_empty());
        let fired = stops.triggered(Commodity::CrudeOil, dec!(85), &orders);
        assert_eq!(fired, vec![id]);
        assert_eq!(stops.pending_count(Commodity::CrudeOil), 0);
    }

    #[test]
    fn sell_stop_triggers_on_falling_price() {
        let stops = StopBook::new();
        let orders: DashMap<OrderId, Order> = DashMap::new();
        let order = stop_order(Side::Sell, dec!(75));
        let id = order.id;
        orders.insert(id, order);
        stops.add(Commodity::CrudeOil, id);

        assert!(stops.triggered(Commodity::CrudeOil, dec!(76), &orders).is_empty());
        let fired = stops.triggered(Commodity::CrudeOil, dec!(75), &orders);
        assert_eq!(fired, vec![id]);
    }

    #[test]
    fn remove_before_trigger_is_idempotent() {
        let stops = StopBook::new();
        let id = Uuid::new_v4();
        stops.add(Commodity::CrudeOil, id);
        assert!(stops.remove(Commodity::CrudeOil, id));
        assert!(!stops.remove(Commodity::CrudeOil, id));
    }
}

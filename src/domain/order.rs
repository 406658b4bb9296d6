//! The `Order` record and the invariants it must uphold throughout its
//! lifecycle (§3).

use super::commodity::{Commodity, OrderKind, OrderStatus, Side, TimeInForce};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque order identity.
pub type OrderId = Uuid;

/// Opaque user identity. The core treats this as an opaque key; identity and
/// credential management live outside the core (§1).
pub type UserId = Uuid;

/// A single order tracked by the core from placement through its terminal
/// state. Orders are created by `OrderManager::place_order`, mutated only
/// through the manager (modify, cancel, fill application), and retained
/// indefinitely — persistence of the retained history is a collaborator's
/// concern (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub commodity: Commodity,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    pub limit_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    pub created_at: i64,
    pub updated_at: i64,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub avg_fill_price: Decimal,
    pub fill_ids: Vec<Uuid>,
}

impl Order {
    /// Remaining + filled must always reconstruct the original quantity
    /// (§3, §8 item 1).
    pub fn invariant_holds(&self) -> bool {
        let totals_match = self.filled_quantity + self.remaining_quantity == self.quantity;
        let status_matches = match self.status {
            OrderStatus::Filled => self.remaining_quantity.is_zero(),
            OrderStatus::Partial => {
                self.filled_quantity > Decimal::ZERO && self.remaining_quantity > Decimal::ZERO
            }
            _ => true,
        };
        totals_match && status_matches
    }

    /// Whether this order, if a limit order, belongs on the book right now.
    pub fn is_resting(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Partial)
    }

    /// Records a fill of `quantity` at `price` against this order, updating
    /// filled/remaining/avg_fill_price/status together so the invariant in
    /// [`Self::invariant_holds`] never observes an intermediate state.
    pub fn apply_fill(&mut self, quantity: Decimal, price: Decimal, now: i64, fill_id: Uuid) {
        assert!(
            quantity > Decimal::ZERO && quantity <= self.remaining_quantity,
            "fill quantity must be positive and not exceed remaining quantity"
        );

        let prior_filled = self.filled_quantity;
        let weighted = self.avg_fill_price * prior_filled + price * quantity;
        self.filled_quantity += quantity;
        self.remaining_quantity -= quantity;
        self.avg_fill_price = weighted / self.filled_quantity;
        self.fill_ids.push(fill_id);
        self.updated_at = now;
        self.status = if self.remaining_quantity.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
    }
}

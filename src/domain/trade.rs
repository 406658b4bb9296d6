//! The `Fill` (trade) record produced by the matching engine (§3, C3).

use super::commodity::Commodity;
use super::order::{OrderId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel user id standing in for the synthetic market maker a residual
/// market order fills against when the book is exhausted (§3, §9). Position
/// accounting skips fills where either side carries this id.
pub fn market_maker_id() -> UserId {
    Uuid::nil()
}

/// One matched transaction between two orders, or between an order and the
/// synthetic market maker. Immutable once published (§3 invariants, §8
/// item 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub id: Uuid,
    pub commodity: Commodity,
    pub quantity: Decimal,
    pub price: Decimal,
    pub aggressor_order_id: OrderId,
    pub passive_order_id: Option<OrderId>,
    pub aggressor_user: UserId,
    pub passive_user: UserId,
    pub timestamp: i64,
}

impl Fill {
    /// quantity * price, the notional value of this fill.
    pub fn value(&self) -> Decimal {
        self.quantity * self.price
    }

    /// True when either counterparty is the synthetic market maker rather
    /// than a real user (§3, §9).
    pub fn against_market_maker(&self) -> bool {
        self.aggressor_user == market_maker_id() || self.passive_user == market_maker_id()
    }
}

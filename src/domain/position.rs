//! Per-`(user, commodity)` position accounting (§3, C4).

use super::commodity::Commodity;
use super::order::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The key the position ledger is keyed by.
pub type PositionKey = (UserId, Commodity);

/// Net position and P&L state for one `(user, commodity)` pair.
///
/// Invariants (§3): when `quantity == 0`, `avg_price == 0`; `avg_price` is
/// never negative; `realized_pnl` is cumulative across the position's
/// lifetime and never resets, even when `quantity` returns to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub user_id: UserId,
    pub commodity: Commodity,
    /// Signed net quantity: positive is long, negative is short.
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub realized_pnl: Decimal,
    /// Cached unrealized P&L, refreshed on every write and on demand by
    /// `PositionLedger::unrealized_pnl` (§4.4).
    pub unrealized_pnl: Decimal,
    pub updated_at: i64,
}

impl Position {
    /// A fresh, flat position for `user_id`/`commodity` at `now`.
    pub fn flat(user_id: UserId, commodity: Commodity, now: i64) -> Self {
        Self {
            user_id,
            commodity,
            quantity: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            updated_at: now,
        }
    }

    /// Mark-to-market value against `market_price`, per §4.4.
    pub fn mark_to_market(&self, market_price: Decimal) -> Decimal {
        self.quantity * (market_price - self.avg_price)
    }
}

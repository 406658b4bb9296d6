//! Position & P&L accounting (C4, §4.4). The `PositionLedger` is the only
//! writer to position state; everything else observes positions through
//! `position_of` / `unrealized_pnl`.

use crate::domain::{Commodity, Position, PositionKey, Side, UserId, market_maker_id};
use crate::oracle::MarketPriceOracle;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::trace;

/// Per-`(user, commodity)` net position tracking with weighted-average
/// cost and realized/unrealized P&L (§3, §4.4).
pub struct PositionLedger {
    positions: DashMap<PositionKey, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self {
            positions: DashMap::new(),
        }
    }

    /// Applies a fill of `signed_qty` (positive for a buy, negative for a
    /// sell, per §4.4's sign convention) at `price` to `(user_id,
    /// commodity)`'s position, updating weighted-average cost and realized
    /// P&L per §3's rules, and returns the updated position.
    ///
    /// The synthetic market maker (§9) never holds a position; callers
    /// should not invoke this for `market_maker_id()`.
    pub fn apply(
        &self,
        user_id: UserId,
        commodity: Commodity,
        signed_qty: Decimal,
        price: Decimal,
        now: i64,
    ) -> Position {
        debug_assert_ne!(user_id, market_maker_id(), "market maker has no position");

        let key = (user_id, commodity);
        let mut entry = self
            .positions
            .entry(key)
            .or_insert_with(|| Position::flat(user_id, commodity, now));

        let prior_qty = entry.quantity;
        let prior_avg = entry.avg_price;

        if prior_qty == Decimal::ZERO || prior_qty.signum() == signed_qty.signum() {
            // Same-side increment (or opening from flat): weighted-average
            // the cost basis across old and new lots.
            let new_qty = prior_qty + signed_qty;
            entry.avg_price = if new_qty.is_zero() {
                Decimal::ZERO
            } else {
                (prior_avg * prior_qty.abs() + price * signed_qty.abs()) / new_qty.abs()
            };
            entry.quantity = new_qty;
        } else {
            // Opposite-side fill: closes all or part of the existing lot.
            let closing_qty = signed_qty.abs().min(prior_qty.abs());
            let realized = closing_qty * (price - prior_avg) * prior_qty.signum();
            entry.realized_pnl += realized;

            let new_qty = prior_qty + signed_qty;
            if signed_qty.abs() > prior_qty.abs() {
                // The fill over-closes the existing lot and flips the
                // position onto the opposite side; the excess opens a
                // fresh lot at the fill price (§3).
                entry.avg_price = price;
            } else if new_qty.is_zero() {
                entry.avg_price = Decimal::ZERO;
            }
            entry.quantity = new_qty;
        }

        entry.updated_at = now;
        trace!(
            %user_id, %commodity,
            quantity = %entry.quantity,
            avg_price = %entry.avg_price,
            realized_pnl = %entry.realized_pnl,
            "position updated"
        );
        *entry
    }

    /// The current stored position for `(user_id, commodity)`, or a flat
    /// position if the pair has never traded (§3: positions exist from the
    /// first fill).
    pub fn position_of(&self, user_id: UserId, commodity: Commodity, now: i64) -> Position {
        self.positions
            .get(&(user_id, commodity))
            .map(|p| *p)
            .unwrap_or_else(|| Position::flat(user_id, commodity, now))
    }

    /// All positions held by `user_id` across commodities.
    pub fn positions_for_user(&self, user_id: UserId) -> Vec<Position> {
        self.positions
            .iter()
            .filter(|e| e.key().0 == user_id)
            .map(|e| *e.value())
            .collect()
    }

    /// Recomputes and caches unrealized P&L for `(user_id, commodity)`
    /// against the oracle's current price (§4.4: "the stored value is a
    /// cache refreshed on every write and on portfolio-summary reads").
    pub fn refresh_unrealized(
        &self,
        user_id: UserId,
        commodity: Commodity,
        oracle: &dyn MarketPriceOracle,
    ) -> Position {
        let market_price = oracle.price(commodity);
        let mut entry = self
            .positions
            .entry((user_id, commodity))
            .or_insert_with(|| Position::flat(user_id, commodity, 0));
        entry.unrealized_pnl = entry.mark_to_market(market_price);
        *entry
    }
}

impl Default for PositionLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps an order side to the signed quantity convention §4.4 specifies.
pub fn signed_quantity(side: Side, quantity: Decimal) -> Decimal {
    quantity * Decimal::from(side.sign())
}

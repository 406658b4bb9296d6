//! The matching engine (C3, §4.2): applies an incoming market or limit
//! order to a commodity's book and produces the resulting fills.
//!
//! Stop and stop-limit orders never reach this function directly; they are
//! promoted to a market/limit order by [`crate::stops::StopBook`] first.

use super::book::OrderBook;
use crate::domain::{Fill, Order, OrderKind, OrderStatus, Side, market_maker_id};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

/// Matches `incoming` against `book`, mutating both `incoming` and every
/// passive order it trades against (via `orders`), and returns the fills
/// produced in execution order. The caller is expected to already hold the
/// per-commodity lock that guards `book` and every order keyed to this
/// commodity (§5).
///
/// For a market order whose residual quantity exceeds book depth, the
/// residual is filled against `oracle_price` and the synthetic market
/// maker (§4.2, §9).
pub fn match_incoming(
    book: &mut OrderBook,
    incoming: &mut Order,
    orders: &DashMap<Uuid, Order>,
    now: i64,
    oracle_price: impl FnOnce() -> Decimal,
) -> Vec<Fill> {
    let mut fills = Vec::new();
    let opposite = incoming.side.opposite();

    loop {
        if incoming.remaining_quantity <= Decimal::ZERO {
            break;
        }
        let Some((price, passive_id)) = book.best_on_side(opposite) else {
            break;
        };
        if incoming.kind == OrderKind::Limit {
            let crosses = match incoming.side {
                Side::Buy => incoming.limit_price.is_some_and(|p| p >= price),
                Side::Sell => incoming.limit_price.is_some_and(|p| p <= price),
            };
            if !crosses {
                break;
            }
        }

        let Some(mut passive) = orders.get_mut(&passive_id) else {
            // Passive order vanished from the master map without being
            // removed from the book; drop the dangling entry and retry.
            book.remove(passive_id);
            continue;
        };

        let fill_qty = incoming.remaining_quantity.min(passive.remaining_quantity);
        if fill_qty <= Decimal::ZERO {
            book.remove(passive_id);
            continue;
        }

        let fill = Fill {
            id: Uuid::new_v4(),
            commodity: incoming.commodity,
            quantity: fill_qty,
            price,
            aggressor_order_id: incoming.id,
            passive_order_id: Some(passive.id),
            aggressor_user: incoming.user_id,
            passive_user: passive.user_id,
            timestamp: now,
        };

        passive.apply_fill(fill_qty, price, now, fill.id);
        incoming.apply_fill(fill_qty, price, now, fill.id);
        debug!(
            commodity = %incoming.commodity,
            price = %price,
            quantity = %fill_qty,
            "matched"
        );

        if passive.status == OrderStatus::Filled {
            let id = passive.id;
            drop(passive);
            book.remove(id);
        }

        fills.push(fill);
    }

    if incoming.kind == OrderKind::Market && incoming.remaining_quantity > Decimal::ZERO {
        let price = oracle_price();
        let fill_qty = incoming.remaining_quantity;
        let fill = Fill {
            id: Uuid::new_v4(),
            commodity: incoming.commodity,
            quantity: fill_qty,
            price,
            aggressor_order_id: incoming.id,
            passive_order_id: None,
            aggressor_user: incoming.user_id,
            passive_user: market_maker_id(),
            timestamp: now,
        };
        incoming.apply_fill(fill_qty, price, now, fill.id);
        debug!(
            commodity = %incoming.commodity,
            price = %price,
            quantity = %fill_qty,
            "matched against synthetic market maker"
        );
        fills.push(fill);
    }

    fills
}

/// Quantity of `side` that `peek_opposite_side` could satisfy up to `price`
/// without mutating the book — used by FOK pre-checks (§4.2, §4.3).
pub fn peek_fillable(
    book: &OrderBook,
    side: Side,
    quantity: Decimal,
    limit_price: Option<Decimal>,
    orders: &DashMap<Uuid, Order>,
) -> Decimal {
    let opposite = side.opposite();
    let mut matched = Decimal::ZERO;
    for level in book.levels(opposite) {
        if let Some(limit) = limit_price {
            let crosses = match side {
                Side::Buy => limit >= level.price,
                Side::Sell => limit <= level.price,
            };
            if !crosses {
                break;
            }
        }
        for order_id in &level.order_ids {
            if matched >= quantity {
                break;
            }
            if let Some(order) = orders.get(order_id) {
                matched += order.remaining_quantity;
            }
        }
        if matched >= quantity {
            break;
        }
    }
    matched.min(quantity)
}

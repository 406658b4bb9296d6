//! The Order Manager (C5, §4.3): owns order lifecycle, validates incoming
//! requests, drives the matching engine and position ledger, and publishes
//! lifecycle events. This is the only public entry point that mutates
//! orders, books, or positions — everything else in the crate is read-only
//! or driven by this type.

use crate::config::TradingConfig;
use crate::domain::{
    Commodity, Fill, Order, OrderId, OrderKind, OrderStatus, Side, TimeInForce, UserId,
    market_maker_id,
};
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventBus};
use crate::ledger::{PositionLedger, signed_quantity};
use crate::oracle::MarketPriceOracle;
use crate::orderbook::{OrderBook, OrderBookSnapshot, match_incoming, peek_fillable, snapshot};
use crate::stops::StopBook;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Request shape for `OrderManager::place_order` (§6: "JSON-compatible
/// records with field names as in §3").
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub user_id: UserId,
    pub commodity: Commodity,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    pub limit_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
}

/// Partial update applied by `OrderManager::modify_order`. `None` leaves
/// the corresponding field unchanged (§4.3).
#[derive(Debug, Clone, Default)]
pub struct ModifyOrderRequest {
    pub limit_price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
}

/// Owns every commodity's book, the master order map, the trade log, and
/// drives the position ledger and event bus. Constructed once by
/// [`crate::engine::CoreEngine`].
pub struct OrderManager {
    config: TradingConfig,
    books: HashMap<Commodity, Mutex<OrderBook>>,
    orders: DashMap<OrderId, Order>,
    user_orders: DashMap<UserId, Vec<OrderId>>,
    last_trade_price: DashMap<Commodity, Decimal>,
    trade_log: RwLock<Vec<Fill>>,
    stops: StopBook,
    ledger: Arc<PositionLedger>,
    oracle: Arc<dyn MarketPriceOracle>,
    events: Arc<EventBus>,
}

impl OrderManager {
    pub fn new(
        config: TradingConfig,
        ledger: Arc<PositionLedger>,
        oracle: Arc<dyn MarketPriceOracle>,
        events: Arc<EventBus>,
    ) -> Self {
        let books = Commodity::ALL
            .into_iter()
            .map(|commodity| (commodity, Mutex::new(OrderBook::new(commodity))))
            .collect();

        Self {
            config,
            books,
            orders: DashMap::new(),
            user_orders: DashMap::new(),
            last_trade_price: DashMap::new(),
            trade_log: RwLock::new(Vec::new()),
            stops: StopBook::new(),
            ledger,
            oracle,
            events,
        }
    }

    fn book_for(&self, commodity: Commodity) -> &Mutex<OrderBook> {
        self.books
            .get(&commodity)
            .expect("a book exists for every commodity in Commodity::ALL")
    }

    fn validate(
        &self,
        kind: OrderKind,
        quantity: Decimal,
        limit_price: Option<Decimal>,
        stop_price: Option<Decimal>,
    ) -> CoreResult<()> {
        if quantity < self.config.min_order_size || quantity > self.config.max_order_size {
            return Err(CoreError::SizeLimitExceeded {
                quantity,
                min: self.config.min_order_size,
                max: self.config.max_order_size,
            });
        }
        if matches!(kind, OrderKind::Limit | OrderKind::StopLimit)
            && !limit_price.is_some_and(|p| p > Decimal::ZERO)
        {
            return Err(CoreError::InvalidOrder {
                reason: "limit and stop-limit orders require a positive limit price".to_string(),
            });
        }
        if matches!(kind, OrderKind::Stop | OrderKind::StopLimit)
            && !stop_price.is_some_and(|p| p > Decimal::ZERO)
        {
            return Err(CoreError::InvalidOrder {
                reason: "stop and stop-limit orders require a positive stop price".to_string(),
            });
        }
        Ok(())
    }

    /// Submits a new order. Validates per §4.3, then either arms it as a
    /// pending stop/stop-limit trigger or matches it immediately.
    pub fn place_order(&self, req: PlaceOrderRequest) -> CoreResult<Order> {
        self.validate(req.kind, req.quantity, req.limit_price, req.stop_price)?;

        let now = now_millis();
        let order = Order {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            commodity: req.commodity,
            side: req.side,
            kind: req.kind,
            quantity: req.quantity,
            limit_price: req.limit_price,
            stop_price: req.stop_price,
            time_in_force: req.time_in_force,
            created_at: now,
            updated_at: now,
            status: OrderStatus::Pending,
            filled_quantity: Decimal::ZERO,
            remaining_quantity: req.quantity,
            avg_fill_price: Decimal::ZERO,
            fill_ids: Vec::new(),
        };

        self.orders.insert(order.id, order.clone());
        self.user_orders.entry(order.user_id).or_default().push(order.id);
        self.events.publish(Event::OrderPlaced(order.clone()));
        info!(order_id = %order.id, commodity = %order.commodity, side = %order.side, "order placed");

        if matches!(order.kind, OrderKind::Stop | OrderKind::StopLimit) {
            self.stops.add(order.commodity, order.id);
            return Ok(order);
        }

        let mut book = self.book_for(order.commodity).lock();

        if order.time_in_force == TimeInForce::Fok && !self.fok_feasible(&book, &order) {
            drop(book);
            let mut rejected = order;
            rejected.status = OrderStatus::Rejected;
            rejected.updated_at = now_millis();
            self.orders.insert(rejected.id, rejected.clone());
            return Err(CoreError::Rejected {
                reason: "fill-or-kill order could not be fully filled at submission".to_string(),
            });
        }

        let mut order = order;
        self.execute_match(&mut book, &mut order, now);
        self.trigger_stops(order.commodity, &mut book, now_millis());
        Ok(order)
    }

    /// Market orders always fill in full against the synthetic market maker
    /// once book depth is exhausted, so a fill-or-kill pre-check is only
    /// meaningful for limit orders (§4.2, §4.3).
    fn fok_feasible(&self, book: &OrderBook, order: &Order) -> bool {
        if order.kind != OrderKind::Limit {
            return true;
        }
        let fillable = peek_fillable(book, order.side, order.remaining_quantity, order.limit_price, &self.orders);
        fillable >= order.remaining_quantity
    }

    /// Runs `order` through the matching engine, applies fills to the
    /// ledger and trade log, publishes `TradeExecuted` for each, and
    /// applies the time-in-force post-condition (§4.2) before recording the
    /// final state into the master order map.
    fn execute_match(&self, book: &mut OrderBook, order: &mut Order, now: i64) -> Vec<Fill> {
        let aggressor_side = order.side;
        let commodity = order.commodity;
        let fills = match_incoming(book, order, &self.orders, now, || self.oracle.price(commodity));

        for fill in &fills {
            self.record_fill(fill, aggressor_side, now);
        }

        if order.time_in_force == TimeInForce::Ioc && order.remaining_quantity > Decimal::ZERO {
            // Any unfilled residual is cancelled immediately; it never rests.
            order.status = OrderStatus::Cancelled;
        } else if order.kind == OrderKind::Limit && order.is_resting() {
            let price = order.limit_price.expect("limit order carries a price");
            book.insert(order.id, order.side, price, order.created_at);
        }

        self.orders.insert(order.id, order.clone());
        fills
    }

    fn record_fill(&self, fill: &Fill, aggressor_side: Side, now: i64) {
        let aggressor_signed = signed_quantity(aggressor_side, fill.quantity);
        let passive_signed = signed_quantity(aggressor_side.opposite(), fill.quantity);

        if fill.aggressor_user != market_maker_id() {
            self.ledger.apply(fill.aggressor_user, fill.commodity, aggressor_signed, fill.price, now);
        }
        if fill.passive_user != market_maker_id() {
            self.ledger.apply(fill.passive_user, fill.commodity, passive_signed, fill.price, now);
        }

        self.trade_log.write().push(fill.clone());
        self.last_trade_price.insert(fill.commodity, fill.price);
        self.events.publish(Event::TradeExecuted(fill.clone()));
    }

    fn reference_price(&self, commodity: Commodity) -> Decimal {
        self.last_trade_price
            .get(&commodity)
            .map(|p| *p)
            .unwrap_or_else(|| self.oracle.price(commodity))
    }

    /// Promotes any pending stop/stop-limit order on `commodity` whose
    /// trigger the current reference price has crossed, feeding each back
    /// through `execute_match`. Runs to a fixed point: a promoted order's
    /// own fills can move the reference price enough to trigger another
    /// stop (§9 "price watcher" design note).
    fn trigger_stops(&self, commodity: Commodity, book: &mut OrderBook, now: i64) {
        loop {
            let reference = self.reference_price(commodity);
            let triggered = self.stops.triggered(commodity, reference, &self.orders);
            if triggered.is_empty() {
                break;
            }
            for order_id in triggered {
                let Some(mut order) = self.orders.get(&order_id).map(|r| r.clone()) else {
                    continue;
                };
                order.kind = match order.kind {
                    OrderKind::Stop => OrderKind::Market,
                    OrderKind::StopLimit => OrderKind::Limit,
                    other => other,
                };
                order.updated_at = now;
                self.orders.insert(order_id, order.clone());
                self.execute_match(book, &mut order, now);
            }
        }
    }

    /// Re-inserts `order` at its prior placement, used to undo a book/stop
    /// removal when a modify fails revalidation (§4.3: a failed modify
    /// leaves the order as it was).
    fn restore_resting(&self, book: &mut OrderBook, order: &Order) {
        if matches!(order.kind, OrderKind::Stop | OrderKind::StopLimit) {
            self.stops.add(order.commodity, order.id);
        } else if order.is_resting() {
            if let Some(price) = order.limit_price {
                book.insert(order.id, order.side, price, order.created_at);
            }
        }
    }

    /// Applies `changes` to an order that is still `pending` or `partial`
    /// (§4.3). Removes it from the book, reapplies validation, and
    /// re-matches if it is still a resting limit order afterward.
    pub fn modify_order(&self, order_id: OrderId, changes: ModifyOrderRequest) -> CoreResult<Order> {
        let old = self
            .orders
            .get(&order_id)
            .map(|r| r.clone())
            .ok_or(CoreError::NotFound { order_id })?;
        if !matches!(old.status, OrderStatus::Pending | OrderStatus::Partial) {
            return Err(CoreError::IllegalTransition {
                order_id,
                reason: format!("cannot modify an order in status {}", old.status),
            });
        }

        let mut book = self.book_for(old.commodity).lock();
        if matches!(old.kind, OrderKind::Stop | OrderKind::StopLimit) {
            self.stops.remove(old.commodity, order_id);
        } else {
            book.remove(order_id);
        }

        let mut updated = old.clone();
        if let Some(quantity) = changes.quantity {
            if quantity < updated.filled_quantity {
                self.restore_resting(&mut book, &old);
                return Err(CoreError::Rejected {
                    reason: "quantity cannot be reduced below already-filled quantity".to_string(),
                });
            }
            updated.quantity = quantity;
            updated.remaining_quantity = quantity - updated.filled_quantity;
        }
        if let Some(price) = changes.limit_price {
            updated.limit_price = Some(price);
        }
        if let Some(price) = changes.stop_price {
            updated.stop_price = Some(price);
        }
        if let Some(tif) = changes.time_in_force {
            updated.time_in_force = tif;
        }

        if let Err(err) = self.validate(updated.kind, updated.quantity, updated.limit_price, updated.stop_price) {
            self.restore_resting(&mut book, &old);
            return Err(err);
        }

        let now = now_millis();
        let price_changed = updated.limit_price != old.limit_price || updated.stop_price != old.stop_price;
        let quantity_increased = updated.quantity > old.quantity;
        updated.created_at = if price_changed || quantity_increased { now } else { old.created_at };
        updated.updated_at = now;

        self.orders.insert(order_id, updated.clone());

        if matches!(updated.kind, OrderKind::Stop | OrderKind::StopLimit) {
            self.stops.add(updated.commodity, order_id);
        } else {
            self.execute_match(&mut book, &mut updated, now);
            self.trigger_stops(updated.commodity, &mut book, now_millis());
        }

        self.events.publish(Event::OrderModified {
            old,
            new: updated.clone(),
        });
        Ok(updated)
    }

    /// Cancels an order that has not reached a terminal state (§4.3).
    pub fn cancel_order(&self, order_id: OrderId) -> CoreResult<Order> {
        let old = self
            .orders
            .get(&order_id)
            .map(|r| r.clone())
            .ok_or(CoreError::NotFound { order_id })?;
        if matches!(old.status, OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected) {
            return Err(CoreError::IllegalTransition {
                order_id,
                reason: format!("cannot cancel an order in status {}", old.status),
            });
        }

        {
            let mut book = self.book_for(old.commodity).lock();
            if matches!(old.kind, OrderKind::Stop | OrderKind::StopLimit) {
                self.stops.remove(old.commodity, order_id);
            } else {
                book.remove(order_id);
            }
        }

        let mut cancelled = old;
        cancelled.status = OrderStatus::Cancelled;
        cancelled.updated_at = now_millis();
        self.orders.insert(order_id, cancelled.clone());
        self.events.publish(Event::OrderCancelled(cancelled.clone()));
        Ok(cancelled)
    }

    /// Cancels every resting `day` order across every commodity (§4.2:
    /// "day: survives until end of trading session; cancelled at session
    /// boundary"). Callers invoke this once per trading day, at session
    /// close; the core itself has no clock of its own to trigger this, so
    /// the session boundary is a caller decision driven by `TradingHours`
    /// (§6).
    pub fn expire_day_orders(&self) -> Vec<Order> {
        let day_order_ids: Vec<OrderId> = self
            .orders
            .iter()
            .filter(|entry| {
                let order = entry.value();
                order.time_in_force == TimeInForce::Day && order.is_resting()
            })
            .map(|entry| *entry.key())
            .collect();

        let mut expired = Vec::with_capacity(day_order_ids.len());
        for order_id in day_order_ids {
            if let Ok(cancelled) = self.cancel_order(order_id) {
                expired.push(cancelled);
            }
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "day orders expired at session close");
        }
        expired
    }

    pub fn get_order(&self, order_id: OrderId) -> CoreResult<Order> {
        self.orders.get(&order_id).map(|r| r.clone()).ok_or(CoreError::NotFound { order_id })
    }

    pub fn list_user_orders(&self, user_id: UserId, status: Option<OrderStatus>) -> Vec<Order> {
        let Some(ids) = self.user_orders.get(&user_id) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.orders.get(id).map(|r| r.clone()))
            .filter(|order| status.map_or(true, |s| order.status == s))
            .collect()
    }

    /// Most-recent-first trade history, optionally filtered by user and/or
    /// commodity (§4.3).
    pub fn get_trade_history(&self, user_id: Option<UserId>, commodity: Option<Commodity>, limit: usize) -> Vec<Fill> {
        self.trade_log
            .read()
            .iter()
            .rev()
            .filter(|fill| user_id.map_or(true, |u| fill.aggressor_user == u || fill.passive_user == u))
            .filter(|fill| commodity.map_or(true, |c| fill.commodity == c))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn get_order_book_snapshot(&self, commodity: Commodity, depth: usize) -> OrderBookSnapshot {
        let book = self.book_for(commodity).lock();
        snapshot(&book, &self.orders, depth)
    }

    /// Every position `user_id` has ever touched, with unrealized P&L
    /// refreshed against the oracle (§4.4).
    pub fn get_portfolio_summary(&self, user_id: UserId) -> Vec<crate::domain::Position> {
        self.ledger
            .positions_for_user(user_id)
            .into_iter()
            .map(|p| self.ledger.refresh_unrealized(user_id, p.commodity, self.oracle.as_ref()))
            .collect()
    }
}

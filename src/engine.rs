//! Composition root. `CoreEngine` owns every piece of mutable state — the
//! order manager, the position ledger, the event bus — and wires the
//! Integration Orchestrator to that bus. Nothing in this crate keeps
//! process-global state outside an engine instance (§9).

use crate::collaborators::{AuditSink, NotificationSink, NullAuditSink, NullNotificationSink, PreferenceStore};
use crate::config::TradingConfig;
use crate::domain::{Commodity, Fill, Order, OrderId, OrderKind, OrderStatus, Position, Side, TimeInForce, UserId};
use crate::error::CoreResult;
use crate::events::EventBus;
use crate::ledger::PositionLedger;
use crate::manager::{ModifyOrderRequest, OrderManager, PlaceOrderRequest};
use crate::oracle::{MarketPriceOracle, StubOracle};
use crate::orchestrator::IntegrationOrchestrator;
use crate::orderbook::OrderBookSnapshot;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Pluggable collaborators handed to [`CoreEngine::new`]. Defaults (via
/// [`Collaborators::default`]) are safe no-ops suitable for tests; a real
/// deployment supplies its own risk/notification/audit/preference and
/// oracle implementations (§1, §6).
pub struct Collaborators {
    pub oracle: Arc<dyn MarketPriceOracle>,
    pub risk_evaluator: Arc<dyn crate::collaborators::RiskEvaluator>,
    pub notifications: Arc<dyn NotificationSink>,
    pub audit: Arc<dyn AuditSink>,
    pub preferences: Arc<dyn PreferenceStore>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            oracle: Arc::new(StubOracle::default()),
            risk_evaluator: Arc::new(crate::collaborators::StubRiskEvaluator {
                max_position_size: TradingConfig::default().max_position_size,
            }),
            notifications: Arc::new(NullNotificationSink),
            audit: Arc::new(NullAuditSink),
            preferences: Arc::new(crate::collaborators::InMemoryPreferenceStore::new()),
        }
    }
}

/// The trading core, assembled once at startup. Cloning the `Arc` this
/// lives behind is how a transport adapter (HTTP/WS, not part of this
/// crate) shares one engine across worker threads.
pub struct CoreEngine {
    manager: OrderManager,
    ledger: Arc<PositionLedger>,
    events: Arc<EventBus>,
    _orchestrator: Arc<IntegrationOrchestrator>,
}

impl CoreEngine {
    pub fn new(config: TradingConfig, collaborators: Collaborators) -> Arc<Self> {
        let ledger = Arc::new(PositionLedger::new());
        let events = Arc::new(EventBus::new());
        let manager = OrderManager::new(config, Arc::clone(&ledger), Arc::clone(&collaborators.oracle), Arc::clone(&events));

        let orchestrator = Arc::new(IntegrationOrchestrator::new(
            collaborators.risk_evaluator,
            collaborators.notifications,
            collaborators.audit,
            collaborators.preferences,
            Arc::clone(&ledger),
        ));
        Arc::clone(&orchestrator).attach(&events);

        info!("trading core engine constructed");
        Arc::new(Self {
            manager,
            ledger,
            events,
            _orchestrator: orchestrator,
        })
    }

    /// Convenience constructor wiring only default (no-op) collaborators;
    /// sufficient for tests and demos.
    pub fn with_defaults() -> Arc<Self> {
        Self::new(TradingConfig::default(), Collaborators::default())
    }

    pub fn place_order(&self, req: PlaceOrderRequest) -> CoreResult<Order> {
        self.manager.place_order(req)
    }

    pub fn modify_order(&self, order_id: OrderId, changes: ModifyOrderRequest) -> CoreResult<Order> {
        self.manager.modify_order(order_id, changes)
    }

    pub fn cancel_order(&self, order_id: OrderId) -> CoreResult<Order> {
        self.manager.cancel_order(order_id)
    }

    pub fn get_order(&self, order_id: OrderId) -> CoreResult<Order> {
        self.manager.get_order(order_id)
    }

    pub fn list_user_orders(&self, user_id: UserId, status: Option<OrderStatus>) -> Vec<Order> {
        self.manager.list_user_orders(user_id, status)
    }

    pub fn get_trade_history(&self, user_id: Option<UserId>, commodity: Option<Commodity>, limit: usize) -> Vec<Fill> {
        self.manager.get_trade_history(user_id, commodity, limit)
    }

    pub fn get_order_book_snapshot(&self, commodity: Commodity, depth: usize) -> OrderBookSnapshot {
        self.manager.get_order_book_snapshot(commodity, depth)
    }

    pub fn get_portfolio_summary(&self, user_id: UserId) -> Vec<Position> {
        self.manager.get_portfolio_summary(user_id)
    }

    /// Cancels every resting `day` order, across every commodity, at
    /// trading-session close (§4.2, §6 `trading_hours`). The engine has no
    /// clock of its own; a scheduler outside this crate calls this once
    /// per session boundary.
    pub fn expire_day_orders(&self) -> Vec<Order> {
        self.manager.expire_day_orders()
    }

    /// Direct ledger access for callers that already hold a position and
    /// only need a fresh mark-to-market (bypasses order-manager lookups).
    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn engine_places_and_cancels_an_order() {
        let engine = CoreEngine::with_defaults();
        let user = Uuid::new_v4();
        let order = engine
            .place_order(PlaceOrderRequest {
                user_id: user,
                commodity: Commodity::NaturalGas,
                side: Side::Buy,
                kind: OrderKind::Limit,
                quantity: dec!(5000),
                limit_price: Some(dec!(3.40)),
                stop_price: None,
                time_in_force: TimeInForce::Gtc,
            })
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        let cancelled = engine.cancel_order(order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[test]
    fn position_flip_scenario_produces_expected_realized_pnl() {
        // Scenario S4: user A holds +200 crude_oil @ 75, sells 500 at market.
        // Quantities below the production min_order_size (1,000, §6) mirror
        // spec.md's literal scenario numbers, so this test uses a looser
        // config rather than `CoreEngine::with_defaults`.
        let config = TradingConfig {
            min_order_size: Decimal::ONE,
            ..TradingConfig::default()
        };
        let engine = CoreEngine::new(config, Collaborators::default());
        let user_a = Uuid::new_v4();
        let counterparty = Uuid::new_v4();

        engine
            .place_order(PlaceOrderRequest {
                user_id: counterparty,
                commodity: Commodity::CrudeOil,
                side: Side::Sell,
                kind: OrderKind::Limit,
                quantity: dec!(200),
                limit_price: Some(dec!(75)),
                stop_price: None,
                time_in_force: TimeInForce::Gtc,
            })
            .unwrap();
        engine
            .place_order(PlaceOrderRequest {
                user_id: user_a,
                commodity: Commodity::CrudeOil,
                side: Side::Buy,
                kind: OrderKind::Market,
                quantity: dec!(200),
                limit_price: None,
                stop_price: None,
                time_in_force: TimeInForce::Ioc,
            })
            .unwrap();

        engine
            .place_order(PlaceOrderRequest {
                user_id: Uuid::new_v4(),
                commodity: Commodity::CrudeOil,
                side: Side::Buy,
                kind: OrderKind::Limit,
                quantity: dec!(500),
                limit_price: Some(dec!(80)),
                stop_price: None,
                time_in_force: TimeInForce::Gtc,
            })
            .unwrap();
        engine
            .place_order(PlaceOrderRequest {
                user_id: user_a,
                commodity: Commodity::CrudeOil,
                side: Side::Sell,
                kind: OrderKind::Market,
                quantity: dec!(500),
                limit_price: None,
                stop_price: None,
                time_in_force: TimeInForce::Ioc,
            })
            .unwrap();

        let summary = engine.get_portfolio_summary(user_a);
        let position = summary.iter().find(|p| p.commodity == Commodity::CrudeOil).unwrap();
        assert_eq!(position.realized_pnl, dec!(1000));
        assert_eq!(position.quantity, dec!(-300));
        assert_eq!(position.avg_price, dec!(80));
    }
}

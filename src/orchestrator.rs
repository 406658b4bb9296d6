//! Integration Orchestrator (C7, §4.6): the only piece of the core that
//! knows about risk, notification, and audit collaborators. It subscribes
//! to the event bus at construction and fans out; the matching engine and
//! order manager never call these collaborators directly.

use crate::collaborators::{
    AuditRecord, AuditSink, NotificationSink, PortfolioSnapshot, PreferenceStore, RiskEvaluator,
    RiskSeverity,
};
use crate::domain::UserPreferences;
use crate::events::{Event, EventBus, Topic};
use crate::ledger::PositionLedger;
use serde_json::json;
use std::sync::Arc;
use tracing::trace;

/// Wires the risk, notification, audit and preference collaborators to
/// the event bus. Constructed once by [`crate::engine::CoreEngine::new`].
pub struct IntegrationOrchestrator {
    risk_evaluator: Arc<dyn RiskEvaluator>,
    notifications: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditSink>,
    preferences: Arc<dyn PreferenceStore>,
    ledger: Arc<PositionLedger>,
}

impl IntegrationOrchestrator {
    pub fn new(
        risk_evaluator: Arc<dyn RiskEvaluator>,
        notifications: Arc<dyn NotificationSink>,
        audit: Arc<dyn AuditSink>,
        preferences: Arc<dyn PreferenceStore>,
        ledger: Arc<PositionLedger>,
    ) -> Self {
        Self {
            risk_evaluator,
            notifications,
            audit,
            preferences,
            ledger,
        }
    }

    /// Registers this orchestrator's handlers on `bus` for all four
    /// topics (§4.6: "Subscribes to all four topics").
    pub fn attach(self: Arc<Self>, bus: &EventBus) {
        let audit_self = Arc::clone(&self);
        bus.subscribe(
            Topic::OrderPlaced,
            Arc::new(move |event| audit_self.on_event(event)),
        );
        let audit_self = Arc::clone(&self);
        bus.subscribe(
            Topic::OrderCancelled,
            Arc::new(move |event| audit_self.on_event(event)),
        );
        let audit_self = Arc::clone(&self);
        bus.subscribe(
            Topic::OrderModified,
            Arc::new(move |event| audit_self.on_event(event)),
        );
        let trade_self = Arc::clone(&self);
        bus.subscribe(
            Topic::TradeExecuted,
            Arc::new(move |event| trade_self.on_event(event)),
        );
    }

    /// Handler errors are logged and never propagate (§4.6, §7); every
    /// branch here is infallible by construction.
    fn on_event(&self, event: &Event) {
        self.write_audit_record(event);
        if let Event::TradeExecuted(trade) = event {
            self.handle_trade_executed(trade);
        }
    }

    fn write_audit_record(&self, event: &Event) {
        let (user_id, action, details) = match event {
            Event::OrderPlaced(order) => (
                order.user_id,
                "order_placed",
                json!({ "order_id": order.id, "commodity": order.commodity.to_string() }),
            ),
            Event::TradeExecuted(trade) => (
                trade.aggressor_user,
                "trade_executed",
                json!({ "trade_id": trade.id, "quantity": trade.quantity.to_string(), "price": trade.price.to_string() }),
            ),
            Event::OrderCancelled(order) => {
                (order.user_id, "order_cancelled", json!({ "order_id": order.id }))
            }
            Event::OrderModified { old, new } => (
                new.user_id,
                "order_modified",
                json!({ "order_id": new.id, "old_status": old.status.to_string() }),
            ),
        };

        self.audit.record(AuditRecord {
            user_id,
            action: action.to_string(),
            details,
            timestamp: new_timestamp(event),
        });
    }

    fn handle_trade_executed(&self, trade: &crate::domain::Fill) {
        if trade.against_market_maker() && trade.aggressor_user == crate::domain::market_maker_id()
        {
            // Only the synthetic counterparty; nothing to risk-assess.
            return;
        }

        let positions = self.ledger.positions_for_user(trade.aggressor_user);
        let snapshot = PortfolioSnapshot {
            positions: &positions,
            recent_trade: trade,
        };
        let alerts = self.risk_evaluator.assess(&snapshot);

        let preferences = self
            .preferences
            .get(trade.aggressor_user)
            .unwrap_or_default();

        for alert in alerts
            .into_iter()
            .filter(|a| matches!(a.severity, RiskSeverity::High | RiskSeverity::Critical))
        {
            self.route_alert(trade.aggressor_user, &alert, &preferences);
        }

        if preferences.trade_notifications {
            self.notifications.notify(
                trade.aggressor_user,
                "trade_executed",
                &format!("filled {} @ {}", trade.quantity, trade.price),
                &preferences,
            );
        }
    }

    fn route_alert(
        &self,
        user_id: crate::domain::UserId,
        alert: &crate::collaborators::RiskAlert,
        preferences: &UserPreferences,
    ) {
        let is_margin_call = alert.alert_type == "margin_call";
        let enabled = if is_margin_call {
            preferences.margin_calls
        } else {
            preferences.risk_alerts
        };
        if !enabled {
            trace!(%user_id, alert_type = %alert.alert_type, "risk alert suppressed by preferences");
            return;
        }

        let kind = if is_margin_call {
            "margin_call"
        } else {
            "risk_breach"
        };
        self.notifications
            .notify(user_id, kind, &alert.message, preferences);
    }
}

fn new_timestamp(event: &Event) -> i64 {
    match event {
        Event::OrderPlaced(o) | Event::OrderCancelled(o) => o.updated_at,
        Event::OrderModified { new, .. } => new.updated_at,
        Event::TradeExecuted(t) => t.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{NullAuditSink, NullNotificationSink};
    use crate::domain::Commodity;
    use std::sync::Mutex;

    struct RecordingRisk {
        calls: Mutex<usize>,
    }

    impl RiskEvaluator for RecordingRisk {
        fn assess(&self, _portfolio: &PortfolioSnapshot<'_>) -> Vec<crate::collaborators::RiskAlert> {
            *self.calls.lock().unwrap() += 1;
            Vec::new()
        }
    }

    #[test]
    fn trade_event_triggers_risk_assessment() {
        use crate::collaborators::InMemoryPreferenceStore;
        use crate::domain::{Fill, UserId};
        use rust_decimal_macros::dec;
        use uuid::Uuid;

        let ledger = Arc::new(PositionLedger::new());
        ledger.apply(UserId::nil(), Commodity::CrudeOil, dec!(1), dec!(1), 0);
        let risk = Arc::new(RecordingRisk {
            calls: Mutex::new(0),
        });
        let orchestrator = Arc::new(IntegrationOrchestrator::new(
            risk.clone(),
            Arc::new(NullNotificationSink),
            Arc::new(NullAuditSink),
            Arc::new(InMemoryPreferenceStore::new()),
            ledger,
        ));

        let trade = Fill {
            id: Uuid::new_v4(),
            commodity: Commodity::CrudeOil,
            quantity: dec!(1),
            price: dec!(80),
            aggressor_order_id: Uuid::new_v4(),
            passive_order_id: None,
            aggressor_user: UserId::new_v4(),
            passive_user: UserId::new_v4(),
            timestamp: 0,
        };

        orchestrator.on_event(&Event::TradeExecuted(trade));
        assert_eq!(*risk.calls.lock().unwrap(), 1);
    }
}

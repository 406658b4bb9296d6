//! Risk Evaluator contract (C8, §4.7). The core exposes only the
//! interface; the rule set (position limits, margin, concentration, VaR)
//! is pluggable and lives outside the core.

use crate::domain::{Fill, Position};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Severity of a risk alert, ordered low to critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// One risk finding produced by assessing a portfolio against the
/// evaluator's rule set (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    pub alert_type: String,
    pub severity: RiskSeverity,
    pub message: String,
    pub current_value: Decimal,
    pub limit: Decimal,
}

/// A snapshot handed to the risk evaluator: the user's current positions
/// plus the trade that just triggered the assessment (§4.6).
pub struct PortfolioSnapshot<'a> {
    pub positions: &'a [Position],
    pub recent_trade: &'a Fill,
}

/// Computes post-trade exposure alerts from a portfolio snapshot (§4.7).
pub trait RiskEvaluator: Send + Sync {
    fn assess(&self, portfolio: &PortfolioSnapshot<'_>) -> Vec<RiskAlert>;
}

/// A risk evaluator that flags exposure above `max_position_size` on the
/// commodity the triggering trade touched. A minimal but real rule,
/// sufficient as the default when no richer evaluator is configured.
pub struct StubRiskEvaluator {
    pub max_position_size: Decimal,
}

impl RiskEvaluator for StubRiskEvaluator {
    fn assess(&self, portfolio: &PortfolioSnapshot<'_>) -> Vec<RiskAlert> {
        let trade_commodity = portfolio.recent_trade.commodity;
        portfolio
            .positions
            .iter()
            .filter(|p| p.commodity == trade_commodity)
            .filter_map(|p| {
                let exposure = p.quantity.abs();
                if exposure > self.max_position_size {
                    Some(RiskAlert {
                        alert_type: "position_limit".to_string(),
                        severity: RiskSeverity::High,
                        message: format!(
                            "{} exposure {exposure} exceeds limit {}",
                            p.commodity, self.max_position_size
                        ),
                        current_value: exposure,
                        limit: self.max_position_size,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Commodity, UserId};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn trade(commodity: Commodity) -> Fill {
        Fill {
            id: Uuid::new_v4(),
            commodity,
            quantity: dec!(1),
            price: dec!(1),
            aggressor_order_id: Uuid::new_v4(),
            passive_order_id: None,
            aggressor_user: UserId::new_v4(),
            passive_user: UserId::new_v4(),
            timestamp: 0,
        }
    }

    #[test]
    fn flags_exposure_above_limit() {
        let evaluator = StubRiskEvaluator {
            max_position_size: dec!(1000),
        };
        let position = Position {
            user_id: Uuid::new_v4(),
            commodity: Commodity::CrudeOil,
            quantity: dec!(1500),
            avg_price: dec!(80),
            realized_pnl: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            updated_at: 0,
        };
        let trade = trade(Commodity::CrudeOil);
        let snapshot = PortfolioSnapshot {
            positions: std::slice::from_ref(&position),
            recent_trade: &trade,
        };
        let alerts = evaluator.assess(&snapshot);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, RiskSeverity::High);
    }

    #[test]
    fn no_alert_within_limit() {
        let evaluator = StubRiskEvaluator {
            max_position_size: dec!(1000),
        };
        let position = Position {
            user_id: Uuid::new_v4(),
            commodity: Commodity::CrudeOil,
            quantity: dec!(500),
            avg_price: dec!(80),
            realized_pnl: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            updated_at: 0,
        };
        let trade = trade(Commodity::CrudeOil);
        let snapshot = PortfolioSnapshot {
            positions: std::slice::from_ref(&position),
            recent_trade: &trade,
        };
        assert!(evaluator.assess(&snapshot).is_empty());
    }
}

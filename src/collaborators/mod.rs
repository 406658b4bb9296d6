//! Outbound collaborator contracts (§6): risk assessment, notification
//! dispatch, audit logging, and preference storage. The core depends only
//! on these traits; concrete implementations (real risk models,
//! email/SMS/Telegram transports, a durable audit store) are external.

mod audit;
mod notification;
mod preferences_store;
mod risk;

pub use audit::{AuditRecord, AuditSink, NullAuditSink};
pub use notification::{NotificationSink, NullNotificationSink};
pub use preferences_store::{InMemoryPreferenceStore, PreferenceStore};
pub use risk::{PortfolioSnapshot, RiskAlert, RiskEvaluator, RiskSeverity, StubRiskEvaluator};

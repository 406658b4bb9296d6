//! Audit sink contract (§6): an append-only record of every event the
//! orchestrator observes, for downstream compliance/audit consumers.

use crate::domain::UserId;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One audit entry. `details` carries a JSON-compatible payload describing
/// the event (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub user_id: UserId,
    pub action: String,
    pub details: serde_json::Value,
    pub timestamp: i64,
}

/// Records an audit entry. Append-only; failure is logged, never
/// propagated to the caller (§6, §7).
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// An audit sink that logs at trace level and otherwise discards records.
/// Sufficient for tests and as a safe default.
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, record: AuditRecord) {
        trace!(user_id = %record.user_id, action = %record.action, "audit record");
    }
}

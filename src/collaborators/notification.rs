//! Notification sink contract (§6): routes a risk/trade event to whatever
//! transport (email, SMS, Telegram) the user's preferences name. The core
//! only depends on the trait; real transports live outside the core (§1).

use crate::domain::{UserId, UserPreferences};
use tracing::trace;

/// Dispatches a notification for `user_id`. Implementations must not block
/// the caller more than a short bounded interval and own their own retry
/// policy (§6).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, user_id: UserId, event_kind: &str, payload: &str, preferences: &UserPreferences);
}

/// A sink that drops every notification, logging at trace level. The
/// default when no real transport is wired up; every call always returns
/// promptly, satisfying the "must not block" contract trivially.
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn notify(&self, user_id: UserId, event_kind: &str, payload: &str, _preferences: &UserPreferences) {
        trace!(%user_id, event_kind, payload, "notification dropped (no sink configured)");
    }
}

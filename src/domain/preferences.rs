//! Per-user notification routing preferences (§3, C9).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A channel a notification can be routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Sms,
    Telegram,
    Push,
}

/// Which event categories a user wants routed, and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Contact identifier (address, phone number, chat id, device token)
    /// per enabled channel.
    pub contacts: HashMap<NotificationChannel, String>,
    pub trade_notifications: bool,
    pub risk_alerts: bool,
    pub margin_calls: bool,
    pub compliance_alerts: bool,
    pub daily_reports: bool,
    pub market_opening: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            contacts: HashMap::new(),
            trade_notifications: true,
            risk_alerts: true,
            margin_calls: true,
            compliance_alerts: true,
            daily_reports: false,
            market_opening: false,
        }
    }
}

/// A partial update applied to an existing `UserPreferences` (§6
/// `PreferenceStore::update`). `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesPatch {
    pub contacts: Option<HashMap<NotificationChannel, String>>,
    pub trade_notifications: Option<bool>,
    pub risk_alerts: Option<bool>,
    pub margin_calls: Option<bool>,
    pub compliance_alerts: Option<bool>,
    pub daily_reports: Option<bool>,
    pub market_opening: Option<bool>,
}

impl UserPreferences {
    /// Applies a patch in place, leaving unset fields untouched.
    pub fn apply_patch(&mut self, patch: PreferencesPatch) {
        if let Some(contacts) = patch.contacts {
            self.contacts = contacts;
        }
        if let Some(v) = patch.trade_notifications {
            self.trade_notifications = v;
        }
        if let Some(v) = patch.risk_alerts {
            self.risk_alerts = v;
        }
        if let Some(v) = patch.margin_calls {
            self.margin_calls = v;
        }
        if let Some(v) = patch.compliance_alerts {
            self.compliance_alerts = v;
        }
        if let Some(v) = patch.daily_reports {
            self.daily_reports = v;
        }
        if let Some(v) = patch.market_opening {
            self.market_opening = v;
        }
    }
}

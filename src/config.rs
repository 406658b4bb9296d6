//! Trading configuration (§6). The supported order types, time-in-force
//! modes, and commodity set are fixed by the spec and modeled as the
//! closed enums in [`crate::domain`] rather than config fields; only the
//! genuinely configurable knobs live here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Trading session window, in a named timezone (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingHours {
    /// Session open, as a local time-of-day.
    pub start: chrono::NaiveTime,
    /// Session close, as a local time-of-day.
    pub end: chrono::NaiveTime,
    /// IANA timezone name the above times are interpreted in, e.g.
    /// `"America/New_York"`.
    pub timezone: String,
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            start: chrono::NaiveTime::from_hms_opt(0, 0, 0).expect("valid time"),
            end: chrono::NaiveTime::from_hms_opt(23, 59, 59).expect("valid time"),
            timezone: "UTC".to_string(),
        }
    }
}

/// The tunable knobs of the trading core (§6). Constructed once at startup
/// and handed to [`crate::engine::CoreEngine::new`]; nothing here is
/// mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    pub max_order_size: Decimal,
    pub min_order_size: Decimal,
    pub max_position_size: Decimal,
    pub trading_hours: TradingHours,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            max_order_size: dec!(10_000_000),
            min_order_size: dec!(1_000),
            max_position_size: dec!(50_000_000),
            trading_hours: TradingHours::default(),
        }
    }
}

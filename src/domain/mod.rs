//! Core data model: the fixed enumerations, the `Order`/`Fill`/`Position`
//! records, and per-user preferences (§3).

mod commodity;
mod order;
mod position;
mod preferences;
mod trade;

pub use commodity::{Commodity, OrderKind, OrderStatus, Side, TimeInForce};
pub use order::{Order, OrderId, UserId};
pub use position::{Position, PositionKey};
pub use preferences::{NotificationChannel, PreferencesPatch, UserPreferences};
pub use trade::{Fill, market_maker_id};

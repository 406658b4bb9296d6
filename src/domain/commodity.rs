//! Fixed enumerations that close over the trading core's domain: the set of
//! tradable commodities, order sides, order types and time-in-force modes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six commodities the core trades. Each commodity owns an
/// independent order book; nothing here is cross-commodity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    CrudeOil,
    NaturalGas,
    HeatingOil,
    Gasoline,
    RenewableCertificates,
    CarbonCredits,
}

impl Commodity {
    /// All commodities the core supports, in a stable order.
    pub const ALL: [Commodity; 6] = [
        Commodity::CrudeOil,
        Commodity::NaturalGas,
        Commodity::HeatingOil,
        Commodity::Gasoline,
        Commodity::RenewableCertificates,
        Commodity::CarbonCredits,
    ];
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Commodity::CrudeOil => "crude_oil",
            Commodity::NaturalGas => "natural_gas",
            Commodity::HeatingOil => "heating_oil",
            Commodity::Gasoline => "gasoline",
            Commodity::RenewableCertificates => "renewable_certificates",
            Commodity::CarbonCredits => "carbon_credits",
        };
        write!(f, "{s}")
    }
}

/// Which side of the book an order rests on or an aggressor hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an aggressor on this side matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// +1 for `Buy`, -1 for `Sell`. Used to sign position deltas (§3).
    pub fn sign(self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// The four order types the core understands (§3). Stop and stop-limit
/// orders never appear in a book directly; see [`crate::stops::StopBook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderKind::Market => "market",
            OrderKind::Limit => "limit",
            OrderKind::Stop => "stop",
            OrderKind::StopLimit => "stop_limit",
        };
        write!(f, "{s}")
    }
}

/// Time-in-force policy (§4.2, glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    Day,
    Gtc,
    Ioc,
    Fok,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeInForce::Day => "day",
            TimeInForce::Gtc => "gtc",
            TimeInForce::Ioc => "ioc",
            TimeInForce::Fok => "fok",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle status of an order (§3 invariants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Partial,
    Filled,
    Cancelled,
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Partial => "partial",
            OrderStatus::Filled => "filled",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

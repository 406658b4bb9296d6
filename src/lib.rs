//! The trading core of an energy-commodities platform: per-commodity
//! limit order books, a price-time-priority matching engine, per-user
//! position and P&L accounting, and a typed event bus that decouples
//! matching from risk assessment, notification, and audit logging.
//!
//! # Design
//!
//! Three subsystems, each owning its own concurrency boundary:
//!
//! - **Order management & matching** ([`manager`], [`orderbook`], [`stops`])
//!   — one [`orderbook::OrderBook`] per commodity, guarded by a per-commodity
//!   lock held for the whole validate-match-apply-publish critical section.
//! - **Position & P&L accounting** ([`ledger`]) — the only writer to
//!   [`domain::Position`] state, keyed by `(user, commodity)`.
//! - **Event bus & integration orchestrator** ([`events`], [`orchestrator`])
//!   — a typed pub/sub layer fanning out to pluggable risk, notification,
//!   and audit collaborators ([`collaborators`]) without coupling the
//!   matching path to any of them.
//!
//! [`engine::CoreEngine`] is the composition root: construct one per
//! process (or per test) via [`engine::CoreEngine::new`] or
//! [`engine::CoreEngine::with_defaults`].

mod collaborators;
mod config;
mod domain;
mod engine;
mod error;
mod events;
mod ledger;
mod manager;
mod oracle;
mod orchestrator;
mod orderbook;
mod stops;

pub use collaborators::{
    AuditRecord, AuditSink, InMemoryPreferenceStore, NotificationSink, NullAuditSink,
    NullNotificationSink, PortfolioSnapshot, PreferenceStore, RiskAlert, RiskEvaluator,
    RiskSeverity, StubRiskEvaluator,
};
pub use config::{TradingConfig, TradingHours};
pub use domain::{
    Commodity, Fill, NotificationChannel, Order, OrderId, OrderKind, OrderStatus, Position,
    PositionKey, PreferencesPatch, Side, TimeInForce, UserId, UserPreferences, market_maker_id,
};
pub use engine::{Collaborators, CoreEngine};
pub use error::{CoreError, CoreResult};
pub use events::{Event, EventBus, Handler, Topic};
pub use ledger::PositionLedger;
pub use manager::{ModifyOrderRequest, OrderManager, PlaceOrderRequest};
pub use oracle::{MarketPriceOracle, StubOracle};
pub use orderbook::{AggregatedLevel, OrderBook, OrderBookSnapshot};

//! Caller-facing error kinds for the order-management contract (§7).

use crate::domain::OrderId;
use thiserror::Error;

/// Errors the core surfaces to callers of `OrderManager`. Internal
/// arithmetic invariant violations (negative remaining, an over-sized
/// fill) are programming errors and are not represented here — they abort
/// the operation via panic inside the per-commodity critical section
/// instead of being returned (§7).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A required field was missing, or an enum value was unsupported.
    #[error("invalid order: {reason}")]
    InvalidOrder {
        /// Human-readable description of what failed validation.
        reason: String,
    },

    /// Quantity fell outside `[min_order_size, max_order_size]`.
    #[error("size limit exceeded: quantity {quantity} not in [{min}, {max}]")]
    SizeLimitExceeded {
        /// The rejected quantity.
        quantity: rust_decimal::Decimal,
        /// The configured minimum.
        min: rust_decimal::Decimal,
        /// The configured maximum.
        max: rust_decimal::Decimal,
    },

    /// The requested commodity is not in the fixed supported set.
    #[error("unsupported commodity: {commodity}")]
    UnsupportedCommodity {
        /// The raw commodity token that was rejected.
        commodity: String,
    },

    /// No order exists with the given id.
    #[error("order not found: {order_id}")]
    NotFound {
        /// The id that could not be resolved.
        order_id: OrderId,
    },

    /// The requested transition is not legal for the order's current
    /// status (e.g. cancel on a filled or already-cancelled order).
    #[error("illegal transition for order {order_id}: {reason}")]
    IllegalTransition {
        /// The order the transition was attempted on.
        order_id: OrderId,
        /// Why the transition is illegal.
        reason: String,
    },

    /// A fill-or-kill order could not be fully filled at submission, or a
    /// modify failed its revalidation pass.
    #[error("rejected: {reason}")]
    Rejected {
        /// Why the order was rejected.
        reason: String,
    },
}

/// Convenience alias for results returned by the order-management contract.
pub type CoreResult<T> = Result<T, CoreError>;

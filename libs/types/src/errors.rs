//! Error taxonomy for the matching engine core
//!
//! Implements spec §7 (Error Handling Design). All errors are returned
//! synchronously from `submit_order`/`cancel_order`; none are ever emitted
//! on the event stream, and a rejected FOK produces no trade and no depth
//! change.

use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed decimal, non-positive quantity, missing price for
    /// Limit/IOC/FOK, or an unknown side/type.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Cancel target absent or already terminal.
    #[error("order not found")]
    NotFound,

    /// FOK could not fully fill, or a Market order found zero opposite
    /// liquidity.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Per-symbol resting-order cap reached.
    #[error("overloaded: {0}")]
    Overloaded(String),
}

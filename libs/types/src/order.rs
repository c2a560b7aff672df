//! Order lifecycle types
//!
//! An `Order` is the unit the matching engine operates on: a side, an
//! order type, an optional limit price, and the quantity still resting.

use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type, tagging both execution style and residual policy
///
/// - `Limit`: rests on the book at `limit_price` if not fully matched.
/// - `Market`: matches against the best available price(s) immediately;
///   any unfilled remainder is cancelled, never rests.
/// - `Ioc` (Immediate-Or-Cancel): matches what it can against `limit_price`
///   or better, cancels any remainder, never rests.
/// - `Fok` (Fill-Or-Kill): matches in full against `limit_price` or better,
///   or is rejected entirely with no partial execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
    Ioc,
    Fok,
}

impl OrderType {
    /// Whether an unmatched remainder of this order type rests on the book.
    pub fn rests_on_book(&self) -> bool {
        matches!(self, OrderType::Limit)
    }

    /// Whether this order type requires all-or-nothing execution.
    pub fn is_all_or_nothing(&self) -> bool {
        matches!(self, OrderType::Fok)
    }

    /// Whether a limit price is required to submit this order type.
    pub fn requires_limit_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::Ioc | OrderType::Fok)
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted and resting on the book, no fills yet.
    Accepted,
    /// Resting with at least one fill so far.
    PartiallyFilled,
    /// Fully matched (terminal).
    Filled,
    /// Cancelled by the user or by the engine after IOC/Market residual
    /// cleanup (terminal).
    Cancelled,
    /// Rejected at submission — never entered the book (terminal).
    Rejected,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// A resting or in-flight order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    /// Required for Limit/IOC/FOK; `None` only for Market orders.
    pub limit_price: Option<Price>,
    pub original_quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub status: OrderStatus,
    /// Monotonic arrival sequence, used for price-time priority and as a
    /// tie-breaker at equal timestamps.
    pub sequence: u64,
    /// Unix nanos at acceptance.
    pub timestamp: i64,
}

impl Order {
    /// Create a new accepted order with a full remaining quantity.
    pub fn new(
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        limit_price: Option<Price>,
        quantity: Quantity,
        sequence: u64,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            symbol,
            side,
            order_type,
            limit_price,
            original_quantity: quantity,
            remaining_quantity: quantity,
            status: OrderStatus::Accepted,
            sequence,
            timestamp,
        }
    }

    /// Check quantity invariant: remaining never exceeds original.
    pub fn check_invariant(&self) -> bool {
        self.remaining_quantity.as_decimal() <= self.original_quantity.as_decimal()
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Check if order has any fills
    pub fn has_fills(&self) -> bool {
        self.remaining_quantity.as_decimal() < self.original_quantity.as_decimal()
    }

    /// Reduce the remaining quantity by a fill and advance status.
    ///
    /// # Panics
    /// Panics if the fill would exceed the remaining quantity.
    pub fn apply_fill(&mut self, fill_quantity: Quantity) {
        let remaining = self.remaining_quantity.as_decimal() - fill_quantity.as_decimal();
        assert!(
            remaining >= rust_decimal::Decimal::ZERO,
            "fill would exceed remaining quantity"
        );

        self.remaining_quantity =
            Quantity::try_new(remaining).expect("fill result is a valid non-negative quantity");

        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };

        debug_assert!(self.check_invariant(), "invariant violated after fill");
    }

    /// Cancel the order (user-initiated, or engine cleanup of an
    /// IOC/Market/FOK residual).
    ///
    /// # Panics
    /// Panics if order is already in a terminal state.
    pub fn cancel(&mut self) {
        assert!(!self.status.is_terminal(), "cannot cancel terminal order");
        self.status = OrderStatus::Cancelled;
    }
}

//! Trade record
//!
//! A `Trade` is the immutable result of one match between a resting
//! (maker) order and an incoming (taker) order. Trade price is always the
//! maker's price.

use crate::ids::{OrderId, Symbol, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single execution between a maker and a taker order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    /// Global monotonic sequence, used to order trades on the event stream.
    pub sequence: u64,
    pub symbol: Symbol,

    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,

    /// The taker's side. The maker was resting on the opposite side.
    pub aggressor_side: Side,
    /// Always the maker's resting price.
    pub price: Price,
    pub quantity: Quantity,

    /// Unix nanos at execution.
    pub executed_at: i64,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        symbol: Symbol,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        aggressor_side: Side,
        price: Price,
        quantity: Quantity,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence,
            symbol,
            maker_order_id,
            taker_order_id,
            aggressor_side,
            price,
            quantity,
            executed_at,
        }
    }

    /// Notional value of the trade (price × quantity), full precision.
    pub fn trade_value(&self) -> Decimal {
        self.quantity.as_decimal() * self.price.as_decimal()
    }
}

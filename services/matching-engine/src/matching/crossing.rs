//! Crossing predicate
//!
//! Determines whether an incoming (taker) order crosses a resting (maker)
//! order at a given price.

use types::numeric::Price;
use types::order::Side;

/// Whether a bid at `bid_price` crosses an ask at `ask_price`.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Whether an incoming order crosses a resting order at `resting_price`.
///
/// `incoming_price` is `None` for a Market order, which crosses any
/// resting price on the opposite side.
pub fn incoming_can_match(incoming_side: Side, incoming_price: Option<Price>, resting_price: Price) -> bool {
    match incoming_price {
        None => true,
        Some(price) => match incoming_side {
            Side::Buy => price >= resting_price,
            Side::Sell => price <= resting_price,
        },
    }
}

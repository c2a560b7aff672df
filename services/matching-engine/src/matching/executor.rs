//! Trade formation
//!
//! Assigns the global monotonic trade sequence and builds the immutable
//! `Trade` record for one maker/taker match. No fee calculation and no
//! self-trade prevention: out of scope for the core.

use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// Produces trades with a monotonically increasing sequence number.
pub struct MatchExecutor {
    sequence_counter: u64,
}

impl MatchExecutor {
    /// Create a new executor starting at `starting_sequence`.
    pub fn new(starting_sequence: u64) -> Self {
        Self {
            sequence_counter: starting_sequence,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Build a trade for one match. `price` is always the maker's price
    /// (maker-price execution); `side` is the taker's (aggressor) side.
    #[allow(clippy::too_many_arguments)]
    pub fn make_trade(
        &mut self,
        symbol: Symbol,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        aggressor_side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Trade {
        let sequence = self.next_sequence();
        Trade::new(
            sequence,
            symbol,
            maker_order_id,
            taker_order_id,
            aggressor_side,
            price,
            quantity,
            timestamp,
        )
    }
}

//! Order book infrastructure module
//!
//! Contains the price level, the two side books, and the per-symbol
//! order book that combines them.

pub mod ask_book;
pub mod bid_book;
pub mod order_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use order_book::{AcceptResult, CancelResult, MarketDataSnapshot, OrderBook};
pub use price_level::PriceLevel;

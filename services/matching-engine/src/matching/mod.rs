//! Matching logic module
//!
//! Crossing predicate and trade formation for the price-time priority
//! matching algorithm. The algorithm itself — the per-order-type walk
//! over the book — lives in `book::order_book` since it needs direct
//! access to both side books.

pub mod crossing;
pub mod executor;

pub use crossing::can_match;
pub use executor::MatchExecutor;

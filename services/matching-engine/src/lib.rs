//! Matching engine core
//!
//! A price-time priority limit order book, one per symbol, behind a
//! facade that serializes mutation per symbol while letting distinct
//! symbols progress in parallel.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced within a level
//! - Deterministic matching (same inputs, same order, → same outputs)
//! - Conservation of quantity (`open_interest` tracks resting remainders)

pub mod book;
pub mod matching;
pub mod engine;
pub mod events;
pub mod publisher;

pub use engine::{EngineConfig, MatchingEngine};

//! Event taxonomy published by the engine
//!
//! Two logical topics: trades and market data. Both carry only positive
//! facts — nothing here is ever emitted for a rejected or failed call.

use serde::{Deserialize, Serialize};
use types::ids::Symbol;
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// A single execution, re-exported on the event stream verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    pub trade: Trade,
}

impl From<Trade> for TradeEvent {
    fn from(trade: Trade) -> Self {
        Self { trade }
    }
}

/// Best-bid-and-offer update for a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BboEvent {
    pub symbol: Symbol,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
}

/// Top-N depth update for one side of a symbol's book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthEvent {
    pub symbol: Symbol,
    pub side: Side,
    pub levels: Vec<(Price, Quantity)>,
}

/// Everything published on the market-data topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MarketDataEvent {
    Bbo(BboEvent),
    Depth(DepthEvent),
}

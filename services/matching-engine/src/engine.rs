//! Matching engine facade
//!
//! Owns the `symbol -> OrderBook` registry and the single-mutator-per-
//! symbol discipline: a `DashMap` gives lock-free concurrent access across
//! symbols, while a `Mutex` around each book serializes submit/cancel calls
//! against that one symbol. Different symbols make progress in parallel;
//! a given symbol never sees two mutations interleaved.

use std::sync::Mutex;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use types::errors::EngineError;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, OrderType, Side};
use types::trade::Trade;

use crate::book::order_book::{BestBidAsk, CancelResult, MarketDataSnapshot, OrderBook};
use crate::events::{BboEvent, DepthEvent, MarketDataEvent, TradeEvent};
use crate::publisher::EventPublisher;

/// Construction-time configuration for a `MatchingEngine`.
///
/// No file parsing: process startup and config-file formats are outside
/// the core's scope. Callers build this directly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-subscriber broadcast buffer capacity (see `publisher`).
    pub publisher_capacity: usize,
    /// Optional cap on resting orders per symbol. `None` = unbounded.
    pub max_resting_orders_per_symbol: Option<usize>,
    /// Default depth returned by `snapshot` when the caller doesn't
    /// specify one explicitly.
    pub market_data_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            publisher_capacity: crate::publisher::DEFAULT_PUBLISHER_CAPACITY,
            max_resting_orders_per_symbol: None,
            market_data_depth: 10,
        }
    }
}

/// Outcome of a successful `submit_order` call.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub executions: Vec<Trade>,
}

/// Outcome of a `cancel_order` call.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled { remaining_at_cancel: Quantity },
    NotFound,
}

/// The matching engine: one order book per symbol, created lazily.
pub struct MatchingEngine {
    books: DashMap<Symbol, Mutex<OrderBook>>,
    publisher: EventPublisher,
    config: EngineConfig,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            books: DashMap::new(),
            publisher: EventPublisher::new(config.publisher_capacity),
            config,
        }
    }

    /// Submit an order. Validates shape, routes to the symbol's book under
    /// its mutation right, and publishes any resulting trade/BBO events
    /// before returning.
    pub fn submit_order(
        &self,
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        limit_price: Option<Price>,
        quantity: Quantity,
        timestamp: i64,
    ) -> Result<SubmitOutcome, EngineError> {
        if quantity.is_zero() {
            return Err(EngineError::BadRequest("quantity must be positive".into()));
        }
        if order_type.requires_limit_price() && limit_price.is_none() {
            return Err(EngineError::BadRequest(format!(
                "{order_type:?} orders require a limit price"
            )));
        }
        if order_type == OrderType::Market && limit_price.is_some() {
            return Err(EngineError::BadRequest(
                "market orders must not carry a limit price".into(),
            ));
        }

        let entry = self
            .books
            .entry(symbol.clone())
            .or_insert_with(|| Mutex::new(OrderBook::new(symbol.clone(), 0)));

        let mut book = entry.lock().expect("order book mutex poisoned");

        if let Some(cap) = self.config.max_resting_orders_per_symbol {
            if book.resting_order_count() >= cap {
                return Err(EngineError::Overloaded(format!(
                    "symbol {symbol} at resting order cap {cap}"
                )));
            }
        }

        let sequence = book.next_order_sequence();
        let order = Order::new(symbol.clone(), side, order_type, limit_price, quantity, sequence, timestamp);
        let order_id = order.order_id;

        let before = book.snapshot(self.config.market_data_depth);
        let result = book.submit(order, timestamp);
        let after = book.snapshot(self.config.market_data_depth);

        for trade in &result.executions {
            self.publisher.publish_trade(TradeEvent::from(trade.clone()));
        }
        self.publish_book_change(&symbol, before, after);

        debug!(%order_id, %symbol, status = ?result.status, "submit_order complete");

        Ok(SubmitOutcome {
            order_id: result.order_id,
            status: result.status,
            executions: result.executions,
        })
    }

    /// Cancel a resting order.
    pub fn cancel_order(&self, symbol: &Symbol, order_id: &OrderId) -> CancelOutcome {
        let Some(entry) = self.books.get(symbol) else {
            return CancelOutcome::NotFound;
        };
        let mut book = entry.lock().expect("order book mutex poisoned");

        let before = book.snapshot(self.config.market_data_depth);
        let result = book.cancel(order_id);
        let after = book.snapshot(self.config.market_data_depth);

        if let CancelResult::Cancelled { .. } = &result {
            self.publish_book_change(symbol, before, after);
        }

        match result {
            CancelResult::Cancelled { remaining_at_cancel } => {
                CancelOutcome::Cancelled { remaining_at_cancel }
            }
            CancelResult::NotFound => CancelOutcome::NotFound,
        }
    }

    pub fn best_bid_ask(&self, symbol: &Symbol) -> BestBidAsk {
        self.books
            .get(symbol)
            .map(|entry| entry.lock().expect("order book mutex poisoned").best_bid_ask())
            .unwrap_or((None, None))
    }

    pub fn snapshot(&self, symbol: &Symbol) -> Option<MarketDataSnapshot> {
        self.books.get(symbol).map(|entry| {
            entry
                .lock()
                .expect("order book mutex poisoned")
                .snapshot(self.config.market_data_depth)
        })
    }

    pub fn subscribe_trades(&self) -> broadcast::Receiver<TradeEvent> {
        self.publisher.subscribe_trades()
    }

    pub fn subscribe_market_data(&self) -> broadcast::Receiver<MarketDataEvent> {
        self.publisher.subscribe_market_data()
    }

    /// Publish one coalesced Depth event per side whose levels changed,
    /// then a BBO event if the best on either side moved. Matches the
    /// emission order for trades/depth/BBO within a single submit/cancel.
    fn publish_book_change(&self, symbol: &Symbol, before: MarketDataSnapshot, after: MarketDataSnapshot) {
        if before.bids != after.bids {
            self.publisher.publish_market_data(MarketDataEvent::Depth(DepthEvent {
                symbol: symbol.clone(),
                side: Side::Buy,
                levels: after.bids.clone(),
            }));
        }
        if before.asks != after.asks {
            self.publisher.publish_market_data(MarketDataEvent::Depth(DepthEvent {
                symbol: symbol.clone(),
                side: Side::Sell,
                levels: after.asks.clone(),
            }));
        }
        if (before.best_bid, before.best_ask) != (after.best_bid, after.best_ask) {
            self.publisher.publish_market_data(MarketDataEvent::Bbo(BboEvent {
                symbol: symbol.clone(),
                best_bid: after.best_bid,
                best_ask: after.best_ask,
            }));
        }
    }
}

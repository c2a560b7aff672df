//! Order book for a single symbol
//!
//! Owns both side books and the order id index; is the sole mutator during
//! matching. This is the "hard part" of the engine: price-time priority,
//! maker-price execution, and the per-order-type residual policy all meet
//! here.

use std::collections::HashMap;
use tracing::{debug, warn};

use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, OrderType, Side};
use types::trade::Trade;

use super::ask_book::AskBook;
use super::bid_book::BidBook;
use crate::matching::crossing;
use crate::matching::executor::MatchExecutor;

/// Result of a `submit` call.
#[derive(Debug, Clone)]
pub struct AcceptResult {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub executions: Vec<Trade>,
}

/// Result of a `cancel` call.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelResult {
    Cancelled { remaining_at_cancel: Quantity },
    NotFound,
}

/// Best bid / best ask, either of which may be absent.
pub type BestBidAsk = (Option<Price>, Option<Price>);

/// Top-N depth snapshot for both sides of a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataSnapshot {
    pub symbol: Symbol,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
}

/// A single symbol's limit order book plus the matching algorithm that
/// runs against it.
pub struct OrderBook {
    symbol: Symbol,
    bids: BidBook,
    asks: AskBook,
    /// order_id -> (side, price) of the resting level; combined with the
    /// level's own internal index this gives O(1) cancel.
    order_index: HashMap<OrderId, (Side, Price)>,
    /// Sum of `remaining_quantity` across all resting orders, maintained
    /// incrementally as an invariant check and for diagnostics.
    open_interest: Quantity,
    executor: MatchExecutor,
    order_sequence: u64,
}

fn sub_qty(a: Quantity, b: Quantity) -> Quantity {
    Quantity::try_new(a.as_decimal() - b.as_decimal()).unwrap_or(Quantity::zero())
}

fn add_qty(a: Quantity, b: Quantity) -> Quantity {
    Quantity::try_new(a.as_decimal() + b.as_decimal()).expect("sum of quantities stays in scale")
}

impl OrderBook {
    pub fn new(symbol: Symbol, starting_sequence: u64) -> Self {
        Self {
            symbol,
            bids: BidBook::new(),
            asks: AskBook::new(),
            order_index: HashMap::new(),
            open_interest: Quantity::zero(),
            executor: MatchExecutor::new(starting_sequence),
            order_sequence: 0,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Assign the next FIFO tie-break sequence for this symbol. Callers
    /// hold the symbol's mutation right (the engine's per-symbol mutex),
    /// so a plain counter is sufficient — no atomics needed.
    pub fn next_order_sequence(&mut self) -> u64 {
        let seq = self.order_sequence;
        self.order_sequence += 1;
        seq
    }

    /// Submit an order for matching. Crosses against the book first; any
    /// remainder is handled per the order's residual policy.
    pub fn submit(&mut self, mut order: Order, timestamp: i64) -> AcceptResult {
        if order.order_type == OrderType::Market {
            let has_liquidity = match order.side {
                Side::Buy => !self.asks.is_empty(),
                Side::Sell => !self.bids.is_empty(),
            };
            if !has_liquidity {
                warn!(order_id = %order.order_id, symbol = %self.symbol, "market order rejected: no opposite side liquidity");
                order.status = OrderStatus::Rejected;
                return AcceptResult {
                    order_id: order.order_id,
                    status: order.status,
                    executions: Vec::new(),
                };
            }
        }

        if order.order_type == OrderType::Fok {
            let limit = order
                .limit_price
                .expect("FOK orders always carry a limit price");
            let available = self.crossable_quantity(order.side, limit);
            if available.as_decimal() < order.remaining_quantity.as_decimal() {
                warn!(order_id = %order.order_id, symbol = %self.symbol, "FOK order rejected: insufficient crossing liquidity");
                order.status = OrderStatus::Rejected;
                return AcceptResult {
                    order_id: order.order_id,
                    status: order.status,
                    executions: Vec::new(),
                };
            }
        }

        let trades = self.run_matching_walk(&mut order, timestamp);

        if order.order_type.rests_on_book() {
            if !order.is_filled() {
                self.insert_resting(&order);
            }
        } else if order.remaining_quantity == order.original_quantity {
            // Zero fills: nothing crossed. A non-resting order with no
            // trades is simply cancelled.
            order.cancel();
        }
        // Otherwise: partial or full fill on a non-resting type. The
        // residual (if any) is discarded without further bookkeeping.

        debug!(
            order_id = %order.order_id,
            symbol = %self.symbol,
            status = ?order.status,
            trades = trades.len(),
            "order submitted"
        );

        AcceptResult {
            order_id: order.order_id,
            status: order.status,
            executions: trades,
        }
    }

    /// Walk the opposite side, consuming makers until the taker is filled
    /// or no more makers cross.
    fn run_matching_walk(&mut self, order: &mut Order, timestamp: i64) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            if order.is_filled() {
                break;
            }

            let matched = match order.side {
                Side::Buy => self.try_match_against_ask(order, timestamp),
                Side::Sell => self.try_match_against_bid(order, timestamp),
            };

            match matched {
                Some(trade) => trades.push(trade),
                None => break,
            }
        }

        trades
    }

    fn try_match_against_ask(&mut self, order: &mut Order, timestamp: i64) -> Option<Trade> {
        let (ask_price, maker_order_id, maker_sequence, maker_quantity) = {
            let (price, level) = self.asks.best_ask_level_mut()?;
            if !crossing::incoming_can_match(order.side, order.limit_price, price) {
                return None;
            }
            let (maker_order_id, maker_sequence, maker_quantity) = level.peek_head()?;
            (price, maker_order_id, maker_sequence, maker_quantity)
        };
        let _ = maker_sequence;

        let match_qty = if order.remaining_quantity.as_decimal() <= maker_quantity.as_decimal() {
            order.remaining_quantity
        } else {
            maker_quantity
        };

        let trade = self.executor.make_trade(
            self.symbol.clone(),
            maker_order_id,
            order.order_id,
            Side::Buy,
            ask_price,
            match_qty,
            timestamp,
        );

        order.apply_fill(match_qty);
        self.open_interest = sub_qty(self.open_interest, match_qty);

        let new_maker_qty = sub_qty(maker_quantity, match_qty);
        {
            let (_, level) = self.asks.best_ask_level_mut().expect("level just matched against");
            level.update_head_quantity(new_maker_qty);
        }
        if new_maker_qty.is_zero() {
            self.order_index.remove(&maker_order_id);
        }
        self.asks.collapse_if_empty(ask_price);

        Some(trade)
    }

    fn try_match_against_bid(&mut self, order: &mut Order, timestamp: i64) -> Option<Trade> {
        let (bid_price, maker_order_id, maker_sequence, maker_quantity) = {
            let (price, level) = self.bids.best_bid_level_mut()?;
            if !crossing::incoming_can_match(order.side, order.limit_price, price) {
                return None;
            }
            let (maker_order_id, maker_sequence, maker_quantity) = level.peek_head()?;
            (price, maker_order_id, maker_sequence, maker_quantity)
        };
        let _ = maker_sequence;

        let match_qty = if order.remaining_quantity.as_decimal() <= maker_quantity.as_decimal() {
            order.remaining_quantity
        } else {
            maker_quantity
        };

        let trade = self.executor.make_trade(
            self.symbol.clone(),
            maker_order_id,
            order.order_id,
            Side::Sell,
            bid_price,
            match_qty,
            timestamp,
        );

        order.apply_fill(match_qty);
        self.open_interest = sub_qty(self.open_interest, match_qty);

        let new_maker_qty = sub_qty(maker_quantity, match_qty);
        {
            let (_, level) = self.bids.best_bid_level_mut().expect("level just matched against");
            level.update_head_quantity(new_maker_qty);
        }
        if new_maker_qty.is_zero() {
            self.order_index.remove(&maker_order_id);
        }
        self.bids.collapse_if_empty(bid_price);

        Some(trade)
    }

    /// Sum of opposite-side quantity at prices crossing `limit`, without
    /// mutating anything. Used by the FOK pre-scan.
    fn crossable_quantity(&self, side: Side, limit: Price) -> Quantity {
        let mut total = Quantity::zero();
        match side {
            Side::Buy => {
                for (price, level) in self.asks.levels_best_first() {
                    if price > limit {
                        break;
                    }
                    total = add_qty(total, level.total_quantity());
                }
            }
            Side::Sell => {
                for (price, level) in self.bids.levels_best_first() {
                    if price < limit {
                        break;
                    }
                    total = add_qty(total, level.total_quantity());
                }
            }
        }
        total
    }

    fn insert_resting(&mut self, order: &Order) {
        let price = order
            .limit_price
            .expect("resting orders always carry a limit price");
        match order.side {
            Side::Buy => self.bids.insert(order),
            Side::Sell => self.asks.insert(order),
        }
        self.order_index.insert(order.order_id, (order.side, price));
        self.open_interest = add_qty(self.open_interest, order.remaining_quantity);
    }

    /// Cancel a resting order. O(1).
    pub fn cancel(&mut self, order_id: &OrderId) -> CancelResult {
        let Some((side, price)) = self.order_index.remove(order_id) else {
            return CancelResult::NotFound;
        };

        let removed = match side {
            Side::Buy => self.bids.remove(order_id, price),
            Side::Sell => self.asks.remove(order_id, price),
        };

        match removed {
            Some(remaining_at_cancel) => {
                self.open_interest = sub_qty(self.open_interest, remaining_at_cancel);
                debug!(order_id = %order_id, symbol = %self.symbol, "order cancelled");
                CancelResult::Cancelled { remaining_at_cancel }
            }
            None => CancelResult::NotFound,
        }
    }

    pub fn best_bid_ask(&self) -> BestBidAsk {
        (self.bids.best_bid_price(), self.asks.best_ask_price())
    }

    pub fn snapshot(&self, depth: usize) -> MarketDataSnapshot {
        MarketDataSnapshot {
            symbol: self.symbol.clone(),
            best_bid: self.bids.best_bid_price(),
            best_ask: self.asks.best_ask_price(),
            bids: self.bids.depth_snapshot(depth),
            asks: self.asks.depth_snapshot(depth),
        }
    }

    /// Sum of `remaining_quantity` across all resting orders.
    pub fn open_interest(&self) -> Quantity {
        self.open_interest
    }

    /// Number of resting orders across both sides, for the optional
    /// per-symbol resting-order cap.
    pub fn resting_order_count(&self) -> usize {
        self.order_index.len()
    }

    #[cfg(test)]
    pub(crate) fn is_crossed(&self) -> bool {
        match self.best_bid_ask() {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::OrderType;

    fn sym() -> Symbol {
        Symbol::new("BTC-USDT")
    }

    fn limit(side: Side, price: u64, qty: &str, seq: u64) -> Order {
        Order::new(
            sym(),
            side,
            OrderType::Limit,
            Some(Price::from_u64(price)),
            Quantity::from_str_exact(qty).unwrap(),
            seq,
            0,
        )
    }

    #[test]
    fn test_resting_order_no_cross() {
        let mut book = OrderBook::new(sym(), 1000);
        let result = book.submit(limit(Side::Buy, 50000, "1.0", 1), 0);
        assert_eq!(result.status, OrderStatus::Accepted);
        assert!(result.executions.is_empty());
        assert!(!book.is_crossed());
    }

    #[test]
    fn test_simple_limit_cross() {
        let mut book = OrderBook::new(sym(), 1000);
        book.submit(limit(Side::Sell, 51000, "1.0", 1), 0);
        let result = book.submit(limit(Side::Buy, 51000, "1.0", 2), 0);

        assert_eq!(result.status, OrderStatus::Filled);
        assert_eq!(result.executions.len(), 1);
        assert_eq!(result.executions[0].price, Price::from_u64(51000));
        assert_eq!(book.best_bid_ask(), (None, None));
    }

    #[test]
    fn test_price_time_priority() {
        let mut book = OrderBook::new(sym(), 1000);
        let order_a = limit(Side::Buy, 50000, "1.0", 1);
        let order_a_id = order_a.order_id;
        book.submit(order_a, 0); // A
        book.submit(limit(Side::Buy, 50000, "1.0", 2), 0); // B

        let result = book.submit(limit(Side::Sell, 50000, "1.0", 3), 0);
        assert_eq!(result.executions.len(), 1);
        // A (sequence 1) must have matched, not B.
        assert_eq!(result.executions[0].maker_order_id, order_a_id);
    }

    #[test]
    fn test_partial_fill_rests() {
        let mut book = OrderBook::new(sym(), 1000);
        book.submit(limit(Side::Sell, 51000, "2.0", 1), 0);
        let result = book.submit(limit(Side::Buy, 51000, "0.5", 2), 0);

        assert_eq!(result.executions.len(), 1);
        assert_eq!(result.executions[0].quantity, Quantity::from_str_exact("0.5").unwrap());
        let (_, best_ask) = book.best_bid_ask();
        assert_eq!(best_ask, Some(Price::from_u64(51000)));
    }

    #[test]
    fn test_market_sweep() {
        let mut book = OrderBook::new(sym(), 1000);
        book.submit(limit(Side::Sell, 51000, "0.3", 1), 0);
        book.submit(limit(Side::Sell, 51100, "0.4", 2), 0);
        book.submit(limit(Side::Sell, 51200, "0.5", 3), 0);

        let market = Order::new(
            sym(),
            Side::Buy,
            OrderType::Market,
            None,
            Quantity::from_str_exact("1.0").unwrap(),
            4,
            0,
        );
        let result = book.submit(market, 0);

        assert_eq!(result.status, OrderStatus::Filled);
        assert_eq!(result.executions.len(), 3);
        assert_eq!(result.executions[2].price, Price::from_u64(51200));
        assert_eq!(result.executions[2].quantity, Quantity::from_str_exact("0.3").unwrap());

        let (_, best_ask) = book.best_bid_ask();
        assert_eq!(best_ask, Some(Price::from_u64(51200)));
    }

    #[test]
    fn test_market_rejected_with_no_liquidity() {
        let mut book = OrderBook::new(sym(), 1000);
        let market = Order::new(
            sym(),
            Side::Buy,
            OrderType::Market,
            None,
            Quantity::from_str_exact("1.0").unwrap(),
            1,
            0,
        );
        let result = book.submit(market, 0);
        assert_eq!(result.status, OrderStatus::Rejected);
        assert!(result.executions.is_empty());
    }

    #[test]
    fn test_ioc_partial_then_cancelled() {
        let mut book = OrderBook::new(sym(), 1000);
        book.submit(limit(Side::Sell, 51000, "0.3", 1), 0);

        let ioc = Order::new(
            sym(),
            Side::Buy,
            OrderType::Ioc,
            Some(Price::from_u64(51000)),
            Quantity::from_str_exact("1.0").unwrap(),
            2,
            0,
        );
        let result = book.submit(ioc, 0);
        assert_eq!(result.executions.len(), 1);
        assert_eq!(result.status, OrderStatus::PartiallyFilled);
        assert!(book.best_bid_ask().0.is_none());
    }

    #[test]
    fn test_fok_reject_leaves_book_unchanged() {
        let mut book = OrderBook::new(sym(), 1000);
        book.submit(limit(Side::Sell, 51000, "0.3", 1), 0);
        book.submit(limit(Side::Sell, 51100, "0.4", 2), 0);

        let before = book.snapshot(10);

        let fok = Order::new(
            sym(),
            Side::Buy,
            OrderType::Fok,
            Some(Price::from_u64(51100)),
            Quantity::from_str_exact("1.0").unwrap(),
            3,
            0,
        );
        let result = book.submit(fok, 0);
        assert_eq!(result.status, OrderStatus::Rejected);
        assert!(result.executions.is_empty());

        let after = book.snapshot(10);
        assert_eq!(before.bids, after.bids);
        assert_eq!(before.asks, after.asks);
    }

    #[test]
    fn test_fok_fills_completely_when_liquidity_sufficient() {
        let mut book = OrderBook::new(sym(), 1000);
        book.submit(limit(Side::Sell, 51000, "0.3", 1), 0);
        book.submit(limit(Side::Sell, 51100, "0.4", 2), 0);

        let fok = Order::new(
            sym(),
            Side::Buy,
            OrderType::Fok,
            Some(Price::from_u64(51100)),
            Quantity::from_str_exact("0.7").unwrap(),
            3,
            0,
        );
        let result = book.submit(fok, 0);
        assert_eq!(result.status, OrderStatus::Filled);
        assert_eq!(result.executions.len(), 2);
        assert!(book.best_bid_ask().1.is_none());
    }

    #[test]
    fn test_cancel_idempotence_on_absence() {
        let mut book = OrderBook::new(sym(), 1000);
        let unknown = OrderId::new();
        assert_eq!(book.cancel(&unknown), CancelResult::NotFound);
        assert_eq!(book.cancel(&unknown), CancelResult::NotFound);
    }

    #[test]
    fn test_cancel_resting_order() {
        let mut book = OrderBook::new(sym(), 1000);
        let order = limit(Side::Buy, 50000, "1.0", 1);
        let order_id = order.order_id;
        book.submit(order, 0);

        let result = book.cancel(&order_id);
        assert!(matches!(result, CancelResult::Cancelled { .. }));
        assert!(book.best_bid_ask().0.is_none());
    }
}

// ── Property-Based Tests ─────────────────────────────────────────────

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use types::order::OrderType;

    fn sym() -> Symbol {
        Symbol::new("BTC-USDT")
    }

    // (side, price, quantity-in-tenths) triples, turned into limit orders
    // with a sequence assigned by position. Bounded to small integer
    // prices/quantities so totals stay exact and failures shrink to
    // something readable.
    fn arb_orders(max_len: usize) -> impl Strategy<Value = Vec<(Side, u64, u64)>> {
        prop::collection::vec(
            (prop_oneof![Just(Side::Buy), Just(Side::Sell)], 1u64..50, 1u64..200),
            1..max_len,
        )
    }

    fn submit_all(book: &mut OrderBook, orders: Vec<(Side, u64, u64)>) {
        for (seq, (side, price, tenths)) in orders.into_iter().enumerate() {
            let qty = Quantity::try_new(Decimal::new(tenths as i64, 1)).unwrap();
            let order = Order::new(sym(), side, OrderType::Limit, Some(Price::from_u64(price)), qty, seq as u64, 0);
            book.submit(order, 0);
        }
    }

    proptest! {
        /// Conservation: open interest always equals the sum of remaining
        /// quantity actually resting in both side books (spec invariant 3).
        #[test]
        fn prop_open_interest_matches_resting_quantity(orders in arb_orders(40)) {
            let mut book = OrderBook::new(sym(), 0);
            submit_all(&mut book, orders);

            let resting_total: Decimal = book
                .bids
                .depth_snapshot(usize::MAX)
                .into_iter()
                .chain(book.asks.depth_snapshot(usize::MAX))
                .map(|(_, q)| q.as_decimal())
                .sum();
            prop_assert_eq!(book.open_interest().as_decimal(), resting_total);
        }

        /// Non-crossed book: after every submit, best_bid < best_ask or one
        /// (or both) is absent (spec invariant 2).
        #[test]
        fn prop_book_never_crossed(orders in arb_orders(30)) {
            let mut book = OrderBook::new(sym(), 0);
            for (seq, (side, price, tenths)) in orders.into_iter().enumerate() {
                let qty = Quantity::try_new(Decimal::new(tenths as i64, 1)).unwrap();
                let order = Order::new(sym(), side, OrderType::Limit, Some(Price::from_u64(price)), qty, seq as u64, 0);
                book.submit(order, 0);
                prop_assert!(!book.is_crossed());
            }
        }
    }
}

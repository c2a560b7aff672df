//! Ask (sell-side) order book
//!
//! Maintains sell orders sorted by price ascending (best ask first).
//! Uses a BTreeMap for deterministic iteration order, with the current
//! best price cached alongside it so `best_ask` is O(1) on the hot path.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::PriceLevel;

/// Ask (sell) side order book
///
/// Orders are sorted by price ascending, so the lowest ask is first.
/// At each price level, orders are maintained in FIFO order.
pub struct AskBook {
    /// Price levels sorted ascending (lowest price first).
    levels: BTreeMap<Price, PriceLevel>,
    /// Cached lowest price, kept in sync with `levels`.
    best: Option<Price>,
}

impl AskBook {
    /// Create a new empty ask book
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
            best: None,
        }
    }

    /// Insert an order into the ask book
    pub fn insert(&mut self, order: &Order) {
        let price = order.limit_price.expect("ask book orders always carry a limit price");
        let level = self.levels.entry(price).or_insert_with(PriceLevel::new);
        level.push_back(order.order_id, order.sequence, order.remaining_quantity);

        self.best = Some(match self.best {
            Some(current) if current <= price => current,
            _ => price,
        });
    }

    /// Remove an order from the ask book
    ///
    /// Returns the order's remaining quantity at the time of removal, or
    /// `None` if it was not found.
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> Option<Quantity> {
        let level = self.levels.get_mut(&price)?;
        let removed = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(&price);
            if self.best == Some(price) {
                self.best = self.levels.keys().next().copied();
            }
        }
        Some(removed)
    }

    /// Get the best ask (lowest price) and its aggregate quantity.
    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        let price = self.best?;
        self.levels.get(&price).map(|level| (price, level.total_quantity()))
    }

    /// Get the best ask price
    pub fn best_ask_price(&self) -> Option<Price> {
        self.best
    }

    /// Get mutable reference to the best ask level
    pub(crate) fn best_ask_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        let price = self.best?;
        self.levels.get_mut(&price).map(|level| (price, level))
    }

    /// Drop the best level if it has become empty and recompute the cache.
    pub(crate) fn collapse_if_empty(&mut self, price: Price) {
        if let Some(level) = self.levels.get(&price) {
            if level.is_empty() {
                self.levels.remove(&price);
                if self.best == Some(price) {
                    self.best = self.levels.keys().next().copied();
                }
            }
        }
    }

    /// Iterate all levels best-first (lowest price first). Used for the
    /// FOK pre-scan, which must not mutate anything it walks.
    pub(crate) fn levels_best_first(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().map(|(price, level)| (*price, level))
    }

    /// Get depth snapshot (top N price levels), best-first.
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// Check if the ask book is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Get the total number of price levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

impl Default for AskBook {
    fn default() -> Self {
        Self::new()
    }
}

//! Non-blocking event publisher
//!
//! Two broadcast topics, `trades` and `market_data`. `tokio::sync::broadcast`
//! gives each subscriber its own bounded ring buffer: a send into a full
//! channel never blocks, it overwrites the oldest unread slot, and a
//! lagging subscriber's next `recv` surfaces `RecvError::Lagged(n)` rather
//! than stalling the sender. The matching path never awaits this.

use tokio::sync::broadcast;

use crate::events::{MarketDataEvent, TradeEvent};

/// Default per-subscriber buffer capacity.
pub const DEFAULT_PUBLISHER_CAPACITY: usize = 1024;

/// Owns the broadcast senders for one engine. Cheap to clone — clones
/// share the same underlying channels.
#[derive(Clone)]
pub struct EventPublisher {
    trades: broadcast::Sender<TradeEvent>,
    market_data: broadcast::Sender<MarketDataEvent>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (trades, _) = broadcast::channel(capacity);
        let (market_data, _) = broadcast::channel(capacity);
        Self { trades, market_data }
    }

    /// Publish a trade. Never blocks; a `SendError` only means there are
    /// currently no subscribers, which is not an error the matching path
    /// needs to react to.
    pub fn publish_trade(&self, event: TradeEvent) {
        let _ = self.trades.send(event);
    }

    /// Publish a BBO or depth update.
    pub fn publish_market_data(&self, event: MarketDataEvent) {
        let _ = self.market_data.send(event);
    }

    pub fn subscribe_trades(&self) -> broadcast::Receiver<TradeEvent> {
        self.trades.subscribe()
    }

    pub fn subscribe_market_data(&self) -> broadcast::Receiver<MarketDataEvent> {
        self.market_data.subscribe()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLISHER_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{OrderId, Symbol, TradeId};
    use types::numeric::{Price, Quantity};
    use types::order::Side;
    use types::trade::Trade;

    fn sample_trade() -> Trade {
        Trade {
            trade_id: TradeId::new(),
            sequence: 1,
            symbol: Symbol::new("BTC-USDT"),
            maker_order_id: OrderId::new(),
            taker_order_id: OrderId::new(),
            aggressor_side: Side::Buy,
            price: Price::from_u64(50000),
            quantity: Quantity::from_str_exact("1.0").unwrap(),
            executed_at: 0,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_trade() {
        let publisher = EventPublisher::new(16);
        let mut rx = publisher.subscribe_trades();

        publisher.publish_trade(TradeEvent::from(sample_trade()));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.trade.sequence, 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let publisher = EventPublisher::new(16);
        publisher.publish_trade(TradeEvent::from(sample_trade()));
    }

    #[tokio::test]
    async fn test_overflow_marks_subscriber_lagged() {
        let publisher = EventPublisher::new(2);
        let mut rx = publisher.subscribe_trades();

        for _ in 0..5 {
            publisher.publish_trade(TradeEvent::from(sample_trade()));
        }

        let result = rx.recv().await;
        assert!(matches!(result, Err(broadcast::error::RecvError::Lagged(_))));
    }
}

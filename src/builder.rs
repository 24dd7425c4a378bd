//! Builder for configuring and constructing an [`OrderBook`].
//!
//! # Example
//! ```rust
//! use rust_order_book::OrderBookBuilder;
//!
//! let book = OrderBookBuilder::new("BTCUSD").with_autostart(true).build().unwrap();
//! assert!(book.is_running());
//! ```
use crate::book::{OrderBook, Snapshot};
use crate::error::Result;

/// A builder for constructing an [`OrderBook`], optionally primed from a
/// starting [`Snapshot`] and optionally started immediately.
pub struct OrderBookBuilder {
    symbol: String,
    autostart: bool,
    snapshot: Option<Snapshot>,
}

impl OrderBookBuilder {
    /// Creates a new builder instance for the given symbol (e.g. `"BTCUSD"`).
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), autostart: false, snapshot: None }
    }

    /// Whether `build()` should call `start()` before returning the book. Defaults to `false`.
    pub fn with_autostart(mut self, enabled: bool) -> Self {
        self.autostart = enabled;
        self
    }

    /// Prime the book with a starting depth snapshot.
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Builds the configured [`OrderBook`]. Fails only if a provided
    /// snapshot is malformed (non-positive price or volume).
    pub fn build(self) -> Result<OrderBook> {
        let book = match self.snapshot {
            Some(snapshot) => OrderBook::from_snapshot(self.symbol, snapshot)?,
            None => OrderBook::new(self.symbol),
        };
        if self.autostart {
            book.start();
        }
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn builder_with_defaults_is_not_running() {
        let book = OrderBookBuilder::new("BTCUSD").build().unwrap();
        assert_eq!(book.symbol(), "BTCUSD");
        assert!(!book.is_running());
    }

    #[test]
    fn builder_with_autostart_starts_the_book() {
        let book = OrderBookBuilder::new("ETHUSD").with_autostart(true).build().unwrap();
        assert!(book.is_running());
        book.stop();
    }

    #[test]
    fn builder_with_snapshot_primes_the_book() {
        let snapshot = Snapshot { asks: vec![(dec!(101), dec!(10))], bids: vec![(dec!(99), dec!(10))] };
        let book = OrderBookBuilder::new("DOGEUSD").with_snapshot(snapshot).build().unwrap();
        assert_eq!(book.best_ask(), Some((dec!(101), dec!(10), 1)));
    }

    #[test]
    fn builder_rejects_malformed_snapshot() {
        let snapshot = Snapshot { asks: vec![(dec!(0), dec!(10))], bids: vec![] };
        assert!(OrderBookBuilder::new("BAD").with_snapshot(snapshot).build().is_err());
    }
}

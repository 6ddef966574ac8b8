//! Order-book snapshot types.
//!
//! A `Snapshot` is a full replace-style view of the top-N levels of one
//! symbol's book. It is produced once per decoded frame and never mutated.

use crate::{Price, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookSide {
    Bid,
    Ask,
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// A single price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub quantity: Size,
}

impl PriceLevel {
    pub fn new(price: Price, quantity: Size) -> Self {
        Self { price, quantity }
    }
}

/// Normalized order-book snapshot.
///
/// Invariant: `bids` are sorted descending by price and `asks` ascending,
/// so the best level of each side is at index 0. Both may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    symbol: String,
    version: i64,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

impl Snapshot {
    /// Build a snapshot, ordering each side best-first.
    pub fn new(
        symbol: impl Into<String>,
        version: i64,
        mut bids: Vec<PriceLevel>,
        mut asks: Vec<PriceLevel>,
    ) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self {
            symbol: symbol.into(),
            version,
            bids,
            asks,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Bid levels, best (highest) first.
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    /// Ask levels, best (lowest) first.
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    /// Levels of one side, best first.
    pub fn levels(&self, side: BookSide) -> &[PriceLevel] {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Spread: best ask - best bid.
    ///
    /// May be zero or negative on a locked/crossed book.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.price.inner().checked_sub(bid.price.inner()).map(Price::new),
            _ => None,
        }
    }

    /// Mid price: (best bid + best ask) / 2.
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price.midpoint(ask.price),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: rust_decimal::Decimal, qty: rust_decimal::Decimal) -> PriceLevel {
        PriceLevel::new(Price::new(price), Size::new(qty))
    }

    #[test]
    fn test_snapshot_orders_sides() {
        let snapshot = Snapshot::new(
            "BTCUSDT",
            1,
            vec![level(dec!(99), dec!(1)), level(dec!(100), dec!(2))],
            vec![level(dec!(102), dec!(1)), level(dec!(101), dec!(3))],
        );

        assert_eq!(snapshot.best_bid().unwrap().price.inner(), dec!(100));
        assert_eq!(snapshot.best_ask().unwrap().price.inner(), dec!(101));
        assert_eq!(snapshot.spread().unwrap().inner(), dec!(1));
        assert_eq!(snapshot.mid_price().unwrap().inner(), dec!(100.5));
    }

    #[test]
    fn test_empty_sides() {
        let snapshot = Snapshot::new("BTCUSDT", 7, Vec::new(), vec![level(dec!(1), dec!(1))]);
        assert!(snapshot.best_bid().is_none());
        assert!(snapshot.spread().is_none());
        assert!(snapshot.mid_price().is_none());
        assert_eq!(snapshot.levels(BookSide::Ask).len(), 1);
    }
}

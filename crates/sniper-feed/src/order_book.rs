//! Current order book.
//!
//! Holds the most recent snapshot as price-keyed levels. Every `apply`
//! replaces the whole book; nothing is merged and no history is kept.

use sniper_core::{BookSide, Price, PriceLevel, Size, Snapshot};
use std::collections::BTreeMap;
use tracing::trace;

/// Canonical current book for downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBook {
    symbol: String,
    version: Option<i64>,
    bids: BTreeMap<Price, Size>,
    asks: BTreeMap<Price, Size>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held state with `snapshot`.
    ///
    /// Duplicate prices within one side collapse to the last level seen.
    pub fn apply(&mut self, snapshot: &Snapshot) {
        self.bids.clear();
        self.asks.clear();

        for level in snapshot.bids() {
            self.bids.insert(level.price, level.quantity);
        }
        for level in snapshot.asks() {
            self.asks.insert(level.price, level.quantity);
        }

        self.symbol.clear();
        self.symbol.push_str(snapshot.symbol());
        self.version = Some(snapshot.version());

        trace!(
            symbol = %self.symbol,
            version = snapshot.version(),
            bids = self.bids.len(),
            asks = self.asks.len(),
            "Order book replaced"
        );
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Version of the applied snapshot, None before the first apply.
    pub fn version(&self) -> Option<i64> {
        self.version
    }

    /// Bid levels, highest price first.
    pub fn bids(&self) -> impl Iterator<Item = PriceLevel> + '_ {
        self.bids
            .iter()
            .rev()
            .map(|(price, qty)| PriceLevel::new(*price, *qty))
    }

    /// Ask levels, lowest price first.
    pub fn asks(&self) -> impl Iterator<Item = PriceLevel> + '_ {
        self.asks
            .iter()
            .map(|(price, qty)| PriceLevel::new(*price, *qty))
    }

    /// Levels of one side, best first.
    pub fn levels(&self, side: BookSide) -> Vec<PriceLevel> {
        match side {
            BookSide::Bid => self.bids().collect(),
            BookSide::Ask => self.asks().collect(),
        }
    }

    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids().next()
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks().next()
    }

    /// Mid price, when both sides are present.
    pub fn mid_price(&self) -> Option<Price> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        bid.price.midpoint(ask.price)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

//! Immutable market snapshot handed to stream consumers

use crate::order::Order;
use luno_types::{MarketStatus, Pair};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point-in-time copy of a market's order book
///
/// Asks are sorted ascending by price, bids descending, so the first entry
/// of each side is the best price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    /// Sequence number the book is current as of
    pub sequence: u64,
    /// Sell orders, best (lowest) first
    pub asks: Vec<Order>,
    /// Buy orders, best (highest) first
    pub bids: Vec<Order>,
    /// Market status
    pub status: MarketStatus,
}

impl MarketState {
    /// Get the best bid
    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.first()
    }

    /// Get the best ask
    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.first()
    }

    /// Get the spread
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Get the mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some((ask.price + bid.price) / Decimal::TWO),
            _ => None,
        }
    }

    /// Counter currency needed to fill every bid
    pub fn bid_depth(&self) -> Decimal {
        self.bids.iter().map(Order::notional).sum()
    }

    /// Base currency resting on the ask side
    pub fn ask_depth(&self) -> Decimal {
        self.asks.iter().map(|o| o.volume).sum()
    }

    /// One-line human readable summary for the given pair
    ///
    /// ```text
    /// [24352] 3500 ZAR - 1217 - 1.00 XBT
    /// ```
    pub fn summary<'a>(&'a self, pair: &'a Pair) -> StateSummary<'a> {
        StateSummary { state: self, pair }
    }
}

/// Display adapter returned by [`MarketState::summary`]
#[derive(Debug, Clone, Copy)]
pub struct StateSummary<'a> {
    state: &'a MarketState,
    pair: &'a Pair,
}

impl fmt::Display for StateSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.state.sequence)?;
        match self.state.mid_price() {
            Some(mid) => write!(
                f,
                "{} {} - {} - {} {}",
                self.state.bid_depth(),
                self.pair.counter,
                mid,
                self.state.ask_depth(),
                self.pair.base
            ),
            None => f.write_str("Empty Orderbook"),
        }
    }
}

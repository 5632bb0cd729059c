//! Resting order value type

use luno_types::OrderEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A resting order on one side of the book
///
/// Orders are values: a fill never mutates an order in place, it produces a
/// new `Order` through [`Order::with_volume`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Order ID assigned by the exchange
    pub order_id: String,
    /// Limit price in counter currency
    pub price: Decimal,
    /// Remaining volume in base currency
    pub volume: Decimal,
}

impl Order {
    /// Create a new order
    pub fn new(order_id: impl Into<String>, price: Decimal, volume: Decimal) -> Self {
        Self {
            order_id: order_id.into(),
            price,
            volume,
        }
    }

    /// Same order with a different remaining volume
    pub fn with_volume(&self, volume: Decimal) -> Self {
        Self {
            order_id: self.order_id.clone(),
            price: self.price,
            volume,
        }
    }

    /// Value of the remaining volume in counter currency
    pub fn notional(&self) -> Decimal {
        self.price * self.volume
    }
}

impl From<&OrderEntry> for Order {
    fn from(entry: &OrderEntry) -> Self {
        Self::new(entry.id.clone(), entry.price, entry.volume)
    }
}

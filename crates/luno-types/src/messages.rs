//! Stream message types for the Luno market stream
//!
//! A stream connection carries, in order:
//!
//! 1. an outbound [`AuthRequest`]
//! 2. an inbound [`SnapshotMessage`] with the full order book
//! 3. inbound [`UpdateMessage`]s, interleaved with keep-alive frames (`""`)

use crate::de::{
    deserialize_decimal, deserialize_null_default, deserialize_optional_decimal,
    deserialize_sequence,
};
use crate::{BookSide, MarketStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The keep-alive frame: the JSON encoding of the empty string
pub const KEEP_ALIVE_FRAME: &str = "\"\"";

// ============================================================================
// Request Types
// ============================================================================

/// Credentials frame sent once, immediately after connecting
///
/// Borrowed so the secret is only materialised for the duration of the send.
#[derive(Clone, Serialize)]
pub struct AuthRequest<'a> {
    pub api_key_id: &'a str,
    pub api_key_secret: &'a str,
}

impl<'a> AuthRequest<'a> {
    /// Create a new auth request
    pub fn new(api_key_id: &'a str, api_key_secret: &'a str) -> Self {
        Self {
            api_key_id,
            api_key_secret,
        }
    }
}

impl std::fmt::Debug for AuthRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// A resting order as listed in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    /// Order ID
    pub id: String,
    /// Limit price
    #[serde(deserialize_with = "deserialize_decimal")]
    pub price: Decimal,
    /// Remaining volume in base currency
    #[serde(deserialize_with = "deserialize_decimal")]
    pub volume: Decimal,
}

impl OrderEntry {
    /// Create a new entry
    pub fn new(id: impl Into<String>, price: Decimal, volume: Decimal) -> Self {
        Self {
            id: id.into(),
            price,
            volume,
        }
    }
}

/// First inbound frame: the full order book of the market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    /// Sequence number the book is current as of
    #[serde(deserialize_with = "deserialize_sequence")]
    pub sequence: u64,
    /// Market status
    pub status: MarketStatus,
    /// Sell orders
    pub asks: Vec<OrderEntry>,
    /// Buy orders
    pub bids: Vec<OrderEntry>,
    /// Server time in Unix milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl SnapshotMessage {
    /// Server time of the snapshot
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }
}

// ============================================================================
// Updates
// ============================================================================

/// A fill against a resting (maker) order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeUpdate {
    /// The resting order that was matched
    pub maker_order_id: String,
    /// Volume traded in base currency
    #[serde(deserialize_with = "deserialize_decimal")]
    pub base: Decimal,
    /// Volume traded in counter currency
    #[serde(
        default,
        deserialize_with = "deserialize_optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub counter: Option<Decimal>,
    /// The incoming order that took liquidity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_order_id: Option<String>,
}

impl TradeUpdate {
    /// Create a trade against `maker_order_id` for `base` volume
    pub fn new(maker_order_id: impl Into<String>, base: Decimal) -> Self {
        Self {
            maker_order_id: maker_order_id.into(),
            base,
            counter: None,
            taker_order_id: None,
        }
    }
}

/// A new order resting on the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUpdate {
    /// Order ID
    pub order_id: String,
    /// Limit price
    #[serde(deserialize_with = "deserialize_decimal")]
    pub price: Decimal,
    /// Volume in base currency
    #[serde(deserialize_with = "deserialize_decimal")]
    pub volume: Decimal,
    /// Side tag, "ASK" or "BID"
    #[serde(rename = "type")]
    pub order_type: String,
}

impl CreateUpdate {
    /// Create a new create update
    pub fn new(
        order_id: impl Into<String>,
        price: Decimal,
        volume: Decimal,
        side: BookSide,
    ) -> Self {
        let order_type = match side {
            BookSide::Bid => "BID",
            BookSide::Ask => "ASK",
        };
        Self {
            order_id: order_id.into(),
            price,
            volume,
            order_type: order_type.to_string(),
        }
    }

    /// Book side named by the type tag, `None` for anything but ASK/BID
    pub fn side(&self) -> Option<BookSide> {
        BookSide::from_order_type(&self.order_type)
    }
}

/// An order leaving the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUpdate {
    pub order_id: String,
}

/// A change in market status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: MarketStatus,
}

/// Incremental diff to the order book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMessage {
    /// Sequence number of this update
    #[serde(deserialize_with = "deserialize_sequence")]
    pub sequence: u64,
    /// Fills against resting orders
    #[serde(
        default,
        deserialize_with = "deserialize_null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub trade_updates: Vec<TradeUpdate>,
    /// New resting order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_update: Option<CreateUpdate>,
    /// Removed order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_update: Option<DeleteUpdate>,
    /// New market status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_update: Option<StatusUpdate>,
    /// Server time in Unix milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl UpdateMessage {
    /// Create an empty update with the given sequence number
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            trade_updates: Vec::new(),
            create_update: None,
            delete_update: None,
            status_update: None,
            timestamp: None,
        }
    }

    /// Add a trade
    pub fn with_trade(mut self, trade: TradeUpdate) -> Self {
        self.trade_updates.push(trade);
        self
    }

    /// Set the create update
    pub fn with_create(mut self, create: CreateUpdate) -> Self {
        self.create_update = Some(create);
        self
    }

    /// Set the delete update
    pub fn with_delete(mut self, order_id: impl Into<String>) -> Self {
        self.delete_update = Some(DeleteUpdate {
            order_id: order_id.into(),
        });
        self
    }

    /// Set the status update
    pub fn with_status(mut self, status: MarketStatus) -> Self {
        self.status_update = Some(StatusUpdate { status });
        self
    }

    /// Returns true if the update carries no book or status change
    pub fn is_empty(&self) -> bool {
        self.trade_updates.is_empty()
            && self.create_update.is_none()
            && self.delete_update.is_none()
            && self.status_update.is_none()
    }

    /// Server time of the update
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }
}

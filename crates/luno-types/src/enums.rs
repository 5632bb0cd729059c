//! Market status and book side enums

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading status of a market as reported by the stream
///
/// Unrecognised values are kept verbatim in [`MarketStatus::Unknown`] so that
/// new upstream states do not break decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketStatus {
    /// Normal trading
    Active,
    /// Only post-only limit orders are accepted
    PostOnly,
    /// Trading disabled
    Disabled,
    /// Any status this SDK does not know about
    Unknown(String),
}

impl MarketStatus {
    /// Returns the status as it appears on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::PostOnly => "POSTONLY",
            Self::Disabled => "DISABLED",
            Self::Unknown(s) => s,
        }
    }

    /// Returns true if the market accepts orders that may take liquidity
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<String> for MarketStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ACTIVE" => Self::Active,
            "POSTONLY" => Self::PostOnly,
            "DISABLED" => Self::Disabled,
            _ => Self::Unknown(s),
        }
    }
}

impl From<&str> for MarketStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<MarketStatus> for String {
    fn from(status: MarketStatus) -> Self {
        match status {
            MarketStatus::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of the order book an order rests on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookSide {
    /// Buy side
    Bid,
    /// Sell side
    Ask,
}

impl BookSide {
    /// Parse the `type` tag of a create update ("BID" or "ASK")
    pub fn from_order_type(order_type: &str) -> Option<Self> {
        match order_type {
            "BID" => Some(Self::Bid),
            "ASK" => Some(Self::Ask),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }
}

//! Currency pairs (XBTZAR format)

use crate::error::LunoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency pair of a Luno market, e.g. XBT/ZAR for the `XBTZAR` symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    /// Base currency code (e.g., "XBT")
    pub base: String,
    /// Counter currency code (e.g., "ZAR")
    pub counter: String,
}

impl Pair {
    /// XBT/ZAR market
    pub const XBT_ZAR: &'static str = "XBTZAR";
    /// ETH/ZAR market
    pub const ETH_ZAR: &'static str = "ETHZAR";
    /// XBT/EUR market
    pub const XBT_EUR: &'static str = "XBTEUR";

    /// Create a pair from its two currency codes (upper-cased)
    pub fn new(base: impl AsRef<str>, counter: impl AsRef<str>) -> Self {
        Self {
            base: base.as_ref().to_uppercase(),
            counter: counter.as_ref().to_uppercase(),
        }
    }

    /// Market symbol as used in stream paths (e.g., "XBTZAR")
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base, self.counter)
    }
}

impl FromStr for Pair {
    type Err = LunoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 6 {
            return Err(LunoError::InvalidPair(s.to_string()));
        }

        let base: String = chars[..3].iter().collect();
        let counter: String = chars[3..].iter().collect();
        Ok(Self::new(base, counter))
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.counter)
    }
}

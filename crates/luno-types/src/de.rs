//! Lenient deserializers for stream fields
//!
//! Luno encodes prices, volumes and sequence numbers as JSON strings. These
//! helpers also accept plain JSON numbers so fixtures and older feeds decode.

use rust_decimal::Decimal;
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// CRITICAL: preserve decimal precision, never go through f64 for plain numbers
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => Decimal::from_str(s.trim()).map_err(D::Error::custom),
        StringOrNumber::Number(n) => {
            let s = n.to_string();
            if s.contains('e') || s.contains('E') {
                Decimal::from_scientific(&s).map_err(D::Error::custom)
            } else {
                Decimal::from_str(&s).map_err(D::Error::custom)
            }
        }
    }
}

/// Optional variant of [`deserialize_decimal`]; `null` maps to `None`
pub fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_decimal")] Decimal);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(d)| d))
}

/// Sequence numbers arrive as `"24352"` or `24352`
pub fn deserialize_sequence<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.trim().parse::<u64>().map_err(D::Error::custom),
        StringOrNumber::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("invalid sequence number: {n}"))),
    }
}

/// Treat an explicit `null` the same as a missing field
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

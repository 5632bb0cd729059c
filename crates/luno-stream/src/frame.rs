//! Inbound frame classification

use luno_types::{LunoError, LunoResult, SnapshotMessage, UpdateMessage};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A decoded inbound text frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// The JSON string `""`
    KeepAlive,
    /// JSON `null`
    Empty,
    /// Any other JSON value
    Payload(Value),
}

/// Classify a text frame
///
/// Text that is not JSON is a fatal [`LunoError::InvalidJson`].
pub fn decode(text: &str) -> LunoResult<Frame> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| LunoError::invalid_json(e.to_string(), text))?;

    Ok(match value {
        Value::Null => Frame::Empty,
        Value::String(s) if s.is_empty() => Frame::KeepAlive,
        other => Frame::Payload(other),
    })
}

/// Interpret a payload as the order book snapshot
pub fn snapshot(payload: Value) -> LunoResult<SnapshotMessage> {
    typed(payload, "snapshot")
}

/// Interpret a payload as an incremental update
pub fn update(payload: Value) -> LunoResult<UpdateMessage> {
    typed(payload, "update")
}

fn typed<T: DeserializeOwned>(payload: Value, kind: &str) -> LunoResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| LunoError::UnexpectedMessage(format!("expected {kind} message: {e}")))
}

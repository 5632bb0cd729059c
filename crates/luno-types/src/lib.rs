//! Shared types for the Luno streaming market data API
//!
//! This crate provides the core type definitions used across the Luno SDK.
//! It has minimal dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`Pair`] - Currency pair parsed from a market symbol (e.g., "XBTZAR")
//! - [`MarketStatus`], [`BookSide`] - Stream enums
//! - [`SnapshotMessage`], [`UpdateMessage`] - Decoded stream frames
//! - [`AuthRequest`] - Outbound credentials frame
//! - [`LunoError`] - Error types

pub mod de;
pub mod enums;
pub mod error;
pub mod messages;
pub mod pair;

// Re-export commonly used types
pub use enums::*;
pub use error::*;
pub use messages::*;
pub use pair::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;

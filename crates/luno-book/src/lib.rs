//! Order book reconstruction engine for the Luno market stream
//!
//! This crate rebuilds a market's order book from a snapshot frame followed by
//! a sequence of update frames. It is synchronous and has no networking code;
//! `luno-stream` drives it from a WebSocket connection.
//!
//! # Example
//!
//! ```
//! use luno_book::MarketStreamState;
//! use luno_types::{MarketStatus, OrderEntry, SnapshotMessage, TradeUpdate, UpdateMessage};
//! use rust_decimal_macros::dec;
//!
//! let snapshot = SnapshotMessage {
//!     sequence: 1,
//!     status: MarketStatus::Active,
//!     asks: vec![OrderEntry::new("a1", dec!(101), dec!(3))],
//!     bids: vec![OrderEntry::new("b1", dec!(100), dec!(2))],
//!     timestamp: None,
//! };
//!
//! let mut book = MarketStreamState::new(Some(&snapshot)).unwrap();
//! book.apply_update(&UpdateMessage::new(2).with_trade(TradeUpdate::new("b1", dec!(1))))
//!     .unwrap();
//!
//! let state = book.snapshot();
//! assert_eq!(state.sequence, 2);
//! assert_eq!(state.bids[0].volume, dec!(1));
//! ```

pub mod order;
pub mod order_set;
pub mod snapshot;
pub mod state;

// Re-export main types
pub use order::Order;
pub use order_set::OrderSet;
pub use snapshot::{MarketState, StateSummary};
pub use state::{MarketStreamState, OutOfOrderUpdate};

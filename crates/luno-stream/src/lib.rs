//! Native WebSocket client for the Luno market stream
//!
//! Connects to `wss://ws.luno.com/api/1/stream/<PAIR>`, authenticates, and
//! keeps a local copy of the market's order book in sync from the snapshot
//! and update frames the server pushes.
//!
//! # Features
//!
//! - Callback driver ([`stream_market`]) and background task ([`MarketHandle`])
//! - Keep-alive frames every 60 seconds on the same connection
//! - Out-of-order updates dropped without corrupting the book
//! - Optional reconnection with exponential backoff
//!
//! # Example
//!
//! ```no_run
//! use luno_stream::{stream_market, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::from_env()?;
//!
//!     stream_market("XBTZAR", credentials, |pair, state, _update| {
//!         println!("{}", state.summary(pair));
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod frame;
pub mod handle;
pub mod reconnect;
pub mod stream;
pub mod transport;

// Re-export main types
pub use config::StreamConfig;
pub use credentials::Credentials;
pub use endpoint::{stream_url, DEFAULT_URL};
pub use frame::Frame;
pub use handle::{MarketHandle, MarketUpdate, UpdateReceiver};
pub use reconnect::ReconnectConfig;
pub use stream::{stream_market, stream_market_with_config, MarketStream};
pub use transport::{Transport, TransportError, WsTransport};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;

pub use luno_book::{MarketState, Order};
pub use luno_types::{LunoError, LunoResult, Pair, UpdateMessage};

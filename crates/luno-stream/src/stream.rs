//! Market stream driver
//!
//! One task owns the transport and multiplexes two things with
//! `tokio::select!`: inbound frames, which advance the order book, and the
//! keep-alive timer, which writes `""` every `keep_alive_interval`. Since a
//! single task does all the writing, frames never interleave on the wire.
//!
//! ```text
//! connect → auth → snapshot → update → update → ... → close
//! ```

use crate::config::{StreamConfig, DEFAULT_KEEP_ALIVE_INTERVAL};
use crate::credentials::Credentials;
use crate::endpoint::stream_url;
use crate::frame::{self, Frame};
use crate::transport::{Transport, WsTransport};
use luno_book::{MarketState, MarketStreamState};
use luno_types::{LunoError, LunoResult, Pair, UpdateMessage, KEEP_ALIVE_FRAME};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, trace, warn};

/// Streams one market's order book over a [`Transport`]
pub struct MarketStream<T: Transport> {
    pair: Pair,
    credentials: Credentials,
    transport: T,
    keep_alive_interval: Duration,
}

impl<T: Transport> MarketStream<T> {
    /// Create a driver for `pair` over an unconnected transport
    pub fn new(pair: Pair, credentials: Credentials, transport: T) -> Self {
        Self {
            pair,
            credentials,
            transport,
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
        }
    }

    /// Set the keep-alive interval
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Market being streamed
    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Connect, authenticate and stream until the connection ends
    ///
    /// `on_update` is called with `None` once the snapshot has been applied,
    /// then with the update for every accepted update frame. Keep-alives,
    /// `null` frames after the snapshot and out-of-order updates do not
    /// trigger a call.
    ///
    /// Returns `Ok(())` when the server closes the connection gracefully.
    #[instrument(skip_all, fields(pair = %self.pair))]
    pub async fn run<F>(&mut self, mut on_update: F) -> LunoResult<()>
    where
        F: FnMut(&Pair, &MarketState, Option<&UpdateMessage>),
    {
        let result = self.session(&mut on_update).await;
        if result.is_err() && self.transport.is_connected() {
            if let Err(e) = self.transport.close().await {
                debug!("Close after error failed: {}", e);
            }
        }
        result
    }

    async fn session<F>(&mut self, on_update: &mut F) -> LunoResult<()>
    where
        F: FnMut(&Pair, &MarketState, Option<&UpdateMessage>),
    {
        self.transport.connect().await?;
        info!(url = self.transport.endpoint(), "Connected");

        self.transport.send(&self.credentials.auth_frame()?).await?;
        debug!(api_key_id = self.credentials.api_key_id(), "Sent credentials");

        let mut keep_alive = interval(self.keep_alive_interval);
        keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut book: Option<MarketStreamState> = None;

        loop {
            tokio::select! {
                received = self.transport.recv() => {
                    match received? {
                        Some(text) => self.handle_frame(&text, &mut book, on_update)?,
                        None => {
                            info!("Stream closed by server");
                            return Ok(());
                        }
                    }
                }
                _ = keep_alive.tick() => {
                    trace!("Sending keep-alive");
                    self.transport.send(KEEP_ALIVE_FRAME).await?;
                }
            }
        }
    }

    fn handle_frame<F>(
        &self,
        text: &str,
        book: &mut Option<MarketStreamState>,
        on_update: &mut F,
    ) -> LunoResult<()>
    where
        F: FnMut(&Pair, &MarketState, Option<&UpdateMessage>),
    {
        let payload = match (frame::decode(text)?, book.as_ref()) {
            (Frame::KeepAlive, _) => {
                trace!("Keep-alive received");
                return Ok(());
            }
            (Frame::Empty, None) => {
                return Err(LunoError::InvalidInitialState(
                    "first frame was null".to_string(),
                ));
            }
            (Frame::Empty, Some(_)) => {
                trace!("Ignoring null frame");
                return Ok(());
            }
            (Frame::Payload(payload), _) => payload,
        };

        let Some(state) = book.as_mut() else {
            let snapshot = frame::snapshot(payload)?;
            let initial = MarketStreamState::new(Some(&snapshot))?;
            info!(
                sequence = initial.sequence(),
                bids = initial.bids().len(),
                asks = initial.asks().len(),
                status = %initial.status(),
                "Order book initialized"
            );
            on_update(&self.pair, &initial.snapshot(), None);
            *book = Some(initial);
            return Ok(());
        };

        let update = frame::update(payload)?;
        if state
            .sequence()
            .checked_add(1)
            .is_some_and(|next| update.sequence > next)
        {
            debug!(
                current = state.sequence(),
                received = update.sequence,
                "Sequence gap"
            );
        }

        match state.apply_update(&update) {
            Ok(()) => on_update(&self.pair, &state.snapshot(), Some(&update)),
            Err(rejected) => warn!(
                current = rejected.current,
                received = rejected.received,
                "Skipping out of order update"
            ),
        }
        Ok(())
    }
}

/// Stream `symbol` from the production endpoint
///
/// Fails with [`LunoError::InvalidPair`] before connecting if `symbol` is not
/// a 6 character market such as `XBTZAR`.
pub async fn stream_market<F>(symbol: &str, credentials: Credentials, on_update: F) -> LunoResult<()>
where
    F: FnMut(&Pair, &MarketState, Option<&UpdateMessage>),
{
    stream_market_with_config(symbol, credentials, &StreamConfig::default(), on_update).await
}

/// Stream `symbol` with a custom configuration
pub async fn stream_market_with_config<F>(
    symbol: &str,
    credentials: Credentials,
    config: &StreamConfig,
    on_update: F,
) -> LunoResult<()>
where
    F: FnMut(&Pair, &MarketState, Option<&UpdateMessage>),
{
    let pair: Pair = symbol.parse()?;
    config.validate()?;

    let transport = WsTransport::from_config(stream_url(&config.base_url, &pair), config);
    MarketStream::new(pair, credentials, transport)
        .with_keep_alive_interval(config.keep_alive_interval)
        .run(on_update)
        .await
}

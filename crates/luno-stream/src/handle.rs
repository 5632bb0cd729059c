//! Background market stream with shared state
//!
//! [`MarketHandle`] runs a [`MarketStream`] on a tokio task. Consumers either
//! poll the latest [`MarketState`] or drain [`MarketUpdate`] events from the
//! receiver. Events are only queued once the receiver has been taken. When reconnection is enabled, every new connection rebuilds the
//! book from the snapshot the server sends after authentication.

use crate::config::StreamConfig;
use crate::credentials::Credentials;
use crate::endpoint::stream_url;
use crate::stream::MarketStream;
use crate::transport::{Transport, WsTransport};
use luno_book::MarketState;
use luno_types::{Decimal, LunoError, LunoResult, Pair, UpdateMessage};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Event receiver type
pub type UpdateReceiver = mpsc::UnboundedReceiver<MarketUpdate>;

/// A book change delivered to consumers
#[derive(Debug, Clone)]
pub struct MarketUpdate {
    /// Market the update belongs to
    pub pair: Pair,
    /// Book after the change
    pub state: MarketState,
    /// The applied update, `None` for the initial snapshot of a connection
    pub update: Option<UpdateMessage>,
}

impl MarketUpdate {
    /// Returns true if this is the first state of a new connection
    pub fn is_snapshot(&self) -> bool {
        self.update.is_none()
    }
}

/// Handle to a market stream running in the background
pub struct MarketHandle {
    pair: Pair,
    latest: Arc<RwLock<Option<MarketState>>>,
    event_rx: Option<UpdateReceiver>,
    subscribed: Arc<AtomicBool>,
    task: JoinHandle<LunoResult<()>>,
}

impl MarketHandle {
    /// Start streaming `symbol` over WebSocket
    ///
    /// Fails before spawning if the symbol or config is invalid.
    pub fn spawn(symbol: &str, credentials: Credentials, config: StreamConfig) -> LunoResult<Self> {
        let pair: Pair = symbol.parse()?;
        config.validate()?;

        let transport_config = config.clone();
        Ok(Self::spawn_with_transport(pair, credentials, config, move |url| {
            WsTransport::from_config(url, &transport_config)
        }))
    }

    /// Start streaming with a custom transport factory
    ///
    /// `make_transport` is called with the stream URL once per connection.
    pub fn spawn_with_transport<T, M>(
        pair: Pair,
        credentials: Credentials,
        config: StreamConfig,
        make_transport: M,
    ) -> Self
    where
        T: Transport + 'static,
        M: FnMut(&str) -> T + Send + 'static,
    {
        let latest = Arc::new(RwLock::new(None));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let subscribed = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(supervise(
            pair.clone(),
            credentials,
            config,
            make_transport,
            Arc::clone(&latest),
            event_tx,
            Arc::clone(&subscribed),
        ));

        Self {
            pair,
            latest,
            event_rx: Some(event_rx),
            subscribed,
            task,
        }
    }

    /// Market being streamed
    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    /// Latest book, `None` until a snapshot arrives or while reconnecting
    pub fn latest(&self) -> Option<MarketState> {
        self.latest.read().clone()
    }

    /// Latest sequence number
    pub fn sequence(&self) -> Option<u64> {
        self.latest.read().as_ref().map(|s| s.sequence)
    }

    /// Current spread
    pub fn spread(&self) -> Option<Decimal> {
        self.latest.read().as_ref().and_then(MarketState::spread)
    }

    /// Current mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        self.latest.read().as_ref().and_then(MarketState::mid_price)
    }

    /// Take the event receiver (can only be called once)
    ///
    /// Updates that arrived before this call are not replayed.
    pub fn take_event_receiver(&mut self) -> Option<UpdateReceiver> {
        let rx = self.event_rx.take()?;
        self.subscribed.store(true, Ordering::Release);
        Some(rx)
    }

    /// Returns true once the stream task has ended
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the stream
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the stream task to end and return its result
    pub async fn join(self) -> LunoResult<()> {
        self.task
            .await
            .map_err(|e| LunoError::WebSocket(format!("stream task failed: {e}")))?
    }
}

/// Errors worth a fresh connection; everything else is a caller mistake
fn should_retry(err: &LunoError) -> bool {
    err.is_retryable() || err.requires_reconnect()
}

async fn supervise<T, M>(
    pair: Pair,
    credentials: Credentials,
    config: StreamConfig,
    mut make_transport: M,
    latest: Arc<RwLock<Option<MarketState>>>,
    event_tx: mpsc::UnboundedSender<MarketUpdate>,
    subscribed: Arc<AtomicBool>,
) -> LunoResult<()>
where
    T: Transport,
    M: FnMut(&str) -> T,
{
    let url = stream_url(&config.base_url, &pair);
    let mut attempt: u32 = 0;

    loop {
        let transport = make_transport(url.as_str());
        let mut stream = MarketStream::new(pair.clone(), credentials.clone(), transport)
            .with_keep_alive_interval(config.keep_alive_interval);

        let mut initialized = false;
        let result = stream
            .run(|pair, state, update| {
                initialized = true;
                *latest.write() = Some(state.clone());
                if !subscribed.load(Ordering::Acquire) {
                    return;
                }
                let _ = event_tx.send(MarketUpdate {
                    pair: pair.clone(),
                    state: state.clone(),
                    update: update.cloned(),
                });
            })
            .await;

        if initialized {
            attempt = 0;
        }

        let err = match result {
            Ok(()) if !config.reconnect.is_enabled() => return Ok(()),
            Ok(()) => LunoError::ConnectionClosed,
            Err(e) if !config.reconnect.is_enabled() || !should_retry(&e) => return Err(e),
            Err(e) => e,
        };

        attempt += 1;
        if !config.reconnect.should_reconnect(attempt) {
            error!(%pair, attempts = attempt - 1, "Reconnection attempts exhausted: {}", err);
            return Err(err);
        }

        *latest.write() = None;
        let delay = config.reconnect.delay_with_jitter(attempt);
        warn!(%pair, ?delay, attempt, "Stream ended, reconnecting: {}", err);
        tokio::time::sleep(delay).await;
        info!(%pair, attempt, "Reconnecting");
    }
}

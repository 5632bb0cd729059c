//! WebSocket transport abstraction
//!
//! This module provides a trait-based abstraction over WebSocket connections,
//! so the stream driver can be unit tested without real network calls.
//!
//! # Example
//!
//! ```no_run
//! use luno_stream::transport::{Transport, WsTransport, TransportError};
//!
//! async fn example() -> Result<(), TransportError> {
//!     let mut transport = WsTransport::new("wss://ws.luno.com/api/1/stream/XBTZAR");
//!     transport.connect().await?;
//!     transport.send(r#""""#).await?;
//!     if let Some(frame) = transport.recv().await? {
//!         println!("Received: {}", frame);
//!     }
//!     Ok(())
//! }
//! ```

use crate::config::{StreamConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_FRAME_SIZE, DEFAULT_ORIGIN};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use luno_types::LunoError;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::ORIGIN, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{
    connect_async_with_config, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, instrument, trace};

/// Transport layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failed
    #[error("connection to {url} failed: {message}")]
    ConnectionFailed { url: String, message: String },

    /// Connection timeout
    #[error("connection to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// Connection closed without a close frame
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Not connected
    #[error("not connected")]
    NotConnected,

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<TransportError> for LunoError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectionFailed { url, message } => LunoError::ConnectionFailed {
                url,
                source: std::io::Error::other(message),
            },
            TransportError::Timeout { url, timeout } => {
                LunoError::ConnectionTimeout { url, timeout }
            }
            TransportError::ConnectionClosed => LunoError::ConnectionClosed,
            other => LunoError::WebSocket(other.to_string()),
        }
    }
}

/// Trait for WebSocket transport abstraction
///
/// Frames are exchanged as text; the driver owns JSON decoding.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the WebSocket endpoint
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Send a text frame
    async fn send(&mut self, message: &str) -> Result<(), TransportError>;

    /// Receive the next text frame
    ///
    /// Returns `None` if the connection was closed gracefully.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;

    /// Close the connection gracefully
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Check if currently connected
    fn is_connected(&self) -> bool;

    /// Get the endpoint URL
    fn endpoint(&self) -> &str;
}

/// Real WebSocket transport using tokio-tungstenite
pub struct WsTransport {
    url: String,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    connect_timeout: Duration,
    max_frame_size: usize,
    origin: String,
}

impl WsTransport {
    /// Create a new WebSocket transport
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }

    /// Create a transport using the limits and headers of a [`StreamConfig`]
    pub fn from_config(url: impl Into<String>, config: &StreamConfig) -> Self {
        Self::new(url)
            .with_timeout(config.connect_timeout)
            .with_max_frame_size(config.max_frame_size)
            .with_origin(config.origin.clone())
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set maximum frame and message size
    pub fn with_max_frame_size(mut self, bytes: usize) -> Self {
        self.max_frame_size = bytes;
        self
    }

    /// Set the `Origin` header
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    fn connection_failed(&self, message: impl ToString) -> TransportError {
        TransportError::ConnectionFailed {
            url: self.url.clone(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn connect(&mut self) -> Result<(), TransportError> {
        debug!("Connecting to WebSocket");

        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| self.connection_failed(e))?;
        let origin = HeaderValue::from_str(&self.origin).map_err(|e| self.connection_failed(e))?;
        request.headers_mut().insert(ORIGIN, origin);

        let mut ws_config = WebSocketConfig::default();
        ws_config.max_message_size = Some(self.max_frame_size);
        ws_config.max_frame_size = Some(self.max_frame_size);

        let connect_future = connect_async_with_config(request, Some(ws_config), false);

        let (ws_stream, _response) = timeout(self.connect_timeout, connect_future)
            .await
            .map_err(|_| TransportError::Timeout {
                url: self.url.clone(),
                timeout: self.connect_timeout,
            })?
            .map_err(|e| self.connection_failed(e))?;

        self.stream = Some(ws_stream);
        debug!("WebSocket connected");
        Ok(())
    }

    // Message contents are never recorded: the auth frame carries the secret
    #[instrument(skip(self, message), fields(len = message.len()))]
    async fn send(&mut self, message: &str) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        stream
            .send(Message::Text(message.to_string()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data)
                        .map(Some)
                        .map_err(|e| TransportError::Protocol(e.to_string()));
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Server closed connection");
                    self.stream = None;
                    return Ok(None);
                }
                // Pings are answered by tungstenite itself
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                    trace!("Control frame");
                }
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
                None => {
                    self.stream = None;
                    return Err(TransportError::ConnectionClosed);
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .close(None)
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Mock transport for testing
///
/// Replays scripted frames from `recv()` and captures everything sent.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockTransport {
    url: String,
    connected: bool,
    /// Frames to return on recv()
    pub responses: std::collections::VecDeque<Result<Option<String>, TransportError>>,
    /// Frames captured from send()
    pub sent_messages: Vec<String>,
    /// Simulate connection failure
    pub fail_connect: bool,
    /// Simulate send failure
    pub fail_send: bool,
    /// Block in recv() once the script is exhausted instead of erroring
    pub hold_open: bool,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a new mock transport
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connected: false,
            responses: std::collections::VecDeque::new(),
            sent_messages: Vec::new(),
            fail_connect: false,
            fail_send: false,
            hold_open: false,
        }
    }

    /// Add a frame to be returned on recv()
    pub fn push_response(&mut self, msg: impl Into<String>) {
        self.responses.push_back(Ok(Some(msg.into())));
    }

    /// Add multiple frames
    pub fn push_responses(&mut self, msgs: impl IntoIterator<Item = impl Into<String>>) {
        for msg in msgs {
            self.push_response(msg);
        }
    }

    /// Simulate a graceful close
    pub fn push_close(&mut self) {
        self.responses.push_back(Ok(None));
    }

    /// Simulate a receive error
    pub fn push_error(&mut self, error: TransportError) {
        self.responses.push_back(Err(error));
    }

    /// Take the captured frames
    pub fn take_sent(&mut self) -> Vec<String> {
        std::mem::take(&mut self.sent_messages)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.fail_connect {
            return Err(TransportError::ConnectionFailed {
                url: self.url.clone(),
                message: "mock connection failure".into(),
            });
        }
        self.connected = true;
        Ok(())
    }

    async fn send(&mut self, message: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if self.fail_send {
            return Err(TransportError::SendFailed("mock send failure".into()));
        }
        self.sent_messages.push(message.to_string());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        match self.responses.pop_front() {
            Some(response) => response,
            None if self.hold_open => std::future::pending().await,
            None => Err(TransportError::ConnectionClosed),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_send_recv() {
        let mut transport = MockTransport::new("wss://mock.test");
        transport.push_response(r#"{"sequence":"1"}"#);

        transport.connect().await.unwrap();
        assert!(transport.is_connected());

        transport.send(r#""""#).await.unwrap();
        assert_eq!(transport.take_sent(), vec![r#""""#.to_string()]);

        let frame = transport.recv().await.unwrap();
        assert!(frame.unwrap().contains("sequence"));
        assert!(matches!(
            transport.recv().await,
            Err(TransportError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_mock_transport_connection_failure() {
        let mut transport = MockTransport::new("wss://mock.test");
        transport.fail_connect = true;

        let result = transport.connect().await;
        assert!(result.is_err());
        assert!(!transport.is_connected());
        assert!(transport.send("x").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_transport_close() {
        let mut transport = MockTransport::new("wss://mock.test");
        transport.push_close();

        transport.connect().await.unwrap();
        let response = transport.recv().await.unwrap();
        assert!(response.is_none());
    }

    #[test]
    fn test_transport_error_conversion() {
        let err: LunoError = TransportError::Timeout {
            url: "wss://ws.luno.com".into(),
            timeout: Duration::from_secs(10),
        }
        .into();
        assert!(matches!(err, LunoError::ConnectionTimeout { .. }));
        assert!(err.is_retryable());

        let err: LunoError = TransportError::ConnectionFailed {
            url: "wss://ws.luno.com".into(),
            message: "refused".into(),
        }
        .into();
        assert!(err.to_string().contains("refused"));

        let err: LunoError = TransportError::ConnectionClosed.into();
        assert!(matches!(err, LunoError::ConnectionClosed));

        let err: LunoError = TransportError::ReceiveFailed("reset".into()).into();
        assert!(matches!(err, LunoError::WebSocket(_)));
    }

    #[test]
    fn test_ws_transport_from_config() {
        let config = StreamConfig::new()
            .with_timeout(Duration::from_secs(2))
            .with_origin("http://example.test/");
        let transport = WsTransport::from_config("wss://ws.luno.com/api/1/stream/XBTZAR", &config);

        assert_eq!(transport.endpoint(), "wss://ws.luno.com/api/1/stream/XBTZAR");
        assert_eq!(transport.connect_timeout, Duration::from_secs(2));
        assert_eq!(transport.origin, "http://example.test/");
        assert!(!transport.is_connected());
    }
}

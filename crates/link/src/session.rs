//! One live WebSocket session to the device.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;

use roomsense_protocol::Command;
use roomsense_protocol::constants::{HANDSHAKE_TIMEOUT, MAX_FRAME_BYTES};

use crate::types::{FailReason, LinkEvent};

/// Errors from the device link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("transport unreachable: {0}")]
    Unreachable(#[source] tungstenite::Error),

    #[error("handshake timed out")]
    HandshakeTimeout,

    #[error("websocket protocol error: {0}")]
    Protocol(#[source] tungstenite::Error),

    #[error("not connected")]
    NotConnected,
}

impl LinkError {
    /// Classification used for status events after a failed connect.
    pub fn fail_reason(&self) -> FailReason {
        match self {
            LinkError::Unreachable(_) => FailReason::Unreachable,
            LinkError::HandshakeTimeout => FailReason::Timeout,
            LinkError::Protocol(_) | LinkError::NotConnected => FailReason::Protocol,
        }
    }
}

/// A live, open connection to the device.
///
/// Only [`connect`](Self::connect) creates one, and only after a completed
/// handshake — there is no "half-open" session value. Dropping or closing
/// cancels the pump tasks.
pub struct LinkSession {
    write_tx: mpsc::Sender<tungstenite::Message>,
    cancel: CancellationToken,
    _read_handle: tokio::task::JoinHandle<()>,
    _write_handle: tokio::task::JoinHandle<()>,
    _ping_handle: tokio::task::JoinHandle<()>,
}

impl LinkSession {
    /// Dials the device and completes the WebSocket handshake, bounded by
    /// [`HANDSHAKE_TIMEOUT`].
    ///
    /// Decoded frames, decode errors, and the eventual disconnect status
    /// are reported through `events`.
    pub async fn connect(
        url: &str,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Self, LinkError> {
        let mut ws_config = tokio_tungstenite::tungstenite::protocol::WebSocketConfig::default();
        ws_config.max_message_size = Some(MAX_FRAME_BYTES);
        ws_config.max_frame_size = Some(MAX_FRAME_BYTES);

        let connect = tokio_tungstenite::connect_async_with_config(url, Some(ws_config), false);
        let (ws_stream, _) = match tokio::time::timeout(HANDSHAKE_TIMEOUT, connect).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(classify_connect_error(e)),
            Err(_) => return Err(LinkError::HandshakeTimeout),
        };

        let (write, read) = ws_stream.split();
        let (write_tx, write_rx) = mpsc::channel::<tungstenite::Message>(64);
        let cancel = CancellationToken::new();

        let write_handle = tokio::spawn(crate::pumps::write::write_pump(
            write,
            write_rx,
            cancel.clone(),
        ));

        let read_handle = tokio::spawn(crate::pumps::read::read_pump(
            read,
            events,
            write_tx.clone(),
            cancel.clone(),
        ));

        let ping_handle = tokio::spawn(crate::pumps::ping::ping_pump(
            write_tx.clone(),
            cancel.clone(),
        ));

        Ok(Self {
            write_tx,
            cancel,
            _read_handle: read_handle,
            _write_handle: write_handle,
            _ping_handle: ping_handle,
        })
    }

    /// Sends an actuator command. Fire-and-forget: the command is queued
    /// onto the writer task without waiting for the transport.
    pub fn send(&self, command: Command) -> Result<(), LinkError> {
        if self.cancel.is_cancelled() {
            return Err(LinkError::NotConnected);
        }
        let msg = tungstenite::Message::Text(command.encode().into());
        self.write_tx
            .try_send(msg)
            .map_err(|_| LinkError::NotConnected)
    }

    /// Requests a close. The writer sends a close frame on its way out and
    /// all pumps stop.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Token that trips once the session is dead — remote close, transport
    /// error, keepalive timeout, or local [`close`](Self::close).
    pub(crate) fn done_signal(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for LinkSession {
    fn drop(&mut self) {
        self.cancel.cancel();
        self._read_handle.abort();
        self._write_handle.abort();
        self._ping_handle.abort();
    }
}

fn classify_connect_error(e: tungstenite::Error) -> LinkError {
    if matches!(e, tungstenite::Error::Io(_)) {
        LinkError::Unreachable(e)
    } else {
        LinkError::Protocol(e)
    }
}

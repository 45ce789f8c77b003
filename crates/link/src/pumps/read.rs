//! Read pump — decodes inbound frames and watches link liveness.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use roomsense_protocol::SensorFrame;
use roomsense_protocol::constants::PONG_WAIT;

use crate::types::{LinkEvent, LinkStatus};

/// Reads messages until the link dies.
///
/// A rolling read deadline doubles as pong tracking: any inbound message
/// resets it, and silence beyond [`PONG_WAIT`] is treated as a dead
/// connection. When the pump exits for a remote reason it cancels the
/// session token (stopping the other pumps) and emits a `Disconnected`
/// status; a local close emits nothing — the supervisor reports that path.
pub(crate) async fn read_pump<S>(
    mut read: S,
    events: mpsc::Sender<LinkEvent>,
    write_tx: mpsc::Sender<tungstenite::Message>,
    cancel: CancellationToken,
) where
    S: StreamExt<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    let deadline = tokio::time::sleep(PONG_WAIT);
    tokio::pin!(deadline);

    let mut local_close = false;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                local_close = true;
                break;
            }

            () = &mut deadline => {
                warn!("keepalive timeout, closing link");
                break;
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        // Any inbound traffic proves the link is alive.
                        deadline.as_mut().reset(tokio::time::Instant::now() + PONG_WAIT);

                        match msg {
                            tungstenite::Message::Text(text) => {
                                handle_frame(text.as_str(), &events).await;
                            }
                            tungstenite::Message::Ping(data) => {
                                trace!("ping, answering");
                                let _ = write_tx.send(tungstenite::Message::Pong(data)).await;
                            }
                            tungstenite::Message::Pong(_) => {
                                trace!("pong");
                            }
                            tungstenite::Message::Close(_) => {
                                debug!("device closed the connection");
                                break;
                            }
                            _ => {} // binary — not ours
                        }
                    }
                    Some(Err(e)) => {
                        warn!("read error: {e}");
                        break;
                    }
                    None => {
                        debug!("stream ended");
                        break;
                    }
                }
            }
        }
    }

    if !local_close {
        cancel.cancel();
        let _ = events.send(LinkEvent::Status(LinkStatus::Disconnected)).await;
    }
}

/// Decodes one text frame. Bad frames are reported and dropped; the
/// session stays open.
async fn handle_frame(text: &str, events: &mpsc::Sender<LinkEvent>) {
    match SensorFrame::parse(text) {
        Ok(frame) => {
            trace!(?frame, "frame");
            let _ = events.send(LinkEvent::Frame(frame)).await;
        }
        Err(e) => {
            warn!("dropping inbound frame: {e}");
            let _ = events
                .send(LinkEvent::DecodeError {
                    detail: e.to_string(),
                })
                .await;
        }
    }
}

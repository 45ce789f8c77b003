//! Retry supervisor — owns the link lifecycle across reconnects.
//!
//! One task drives the state machine: dial, run the session until it dies,
//! back off, dial again. The engine talks to it through [`LinkHandle`].

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use roomsense_protocol::Command;

use crate::session::{LinkError, LinkSession};
use crate::types::{ConnectionState, LinkEvent, LinkStatus, RetryPolicy};

/// Handle to a running link task.
///
/// Commands go through the session slot the supervisor keeps current;
/// [`state`](Self::state) exposes the machine for status queries.
pub struct LinkHandle {
    session: Arc<Mutex<Option<LinkSession>>>,
    state: Arc<RwLock<ConnectionState>>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl LinkHandle {
    /// Current state of the connection machine.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Sends a command over the live session.
    ///
    /// Reports [`LinkError::NotConnected`] in every state except `Open` —
    /// commands are never queued for later.
    pub async fn send(&self, command: Command) -> Result<(), LinkError> {
        match self.session.lock().await.as_ref() {
            Some(session) => session.send(command),
            None => Err(LinkError::NotConnected),
        }
    }

    /// Stops the link: cancels any pending handshake or retry timer,
    /// closes the session, and waits for the supervisor to wind down.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Some(session) = self.session.lock().await.take() {
            session.close();
        }
        let _ = self.task.await;
    }
}

/// Spawns the supervisor task for `endpoint` and returns its handle.
///
/// All link output — status transitions, frames, decode errors — goes to
/// `events`. The channel closing is the caller's signal that the link task
/// is gone for good.
pub fn run_link(
    endpoint: String,
    policy: RetryPolicy,
    events: mpsc::Sender<LinkEvent>,
) -> LinkHandle {
    let session = Arc::new(Mutex::new(None));
    let state = Arc::new(RwLock::new(ConnectionState::Idle));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(supervise(
        endpoint,
        policy,
        events,
        session.clone(),
        state.clone(),
        cancel.clone(),
    ));

    LinkHandle {
        session,
        state,
        cancel,
        task,
    }
}

async fn supervise(
    endpoint: String,
    policy: RetryPolicy,
    events: mpsc::Sender<LinkEvent>,
    session_slot: Arc<Mutex<Option<LinkSession>>>,
    state: Arc<RwLock<ConnectionState>>,
    cancel: CancellationToken,
) {
    let mut failures: u32 = 0;

    loop {
        set_state(&state, ConnectionState::Connecting).await;
        let _ = events.send(LinkEvent::Status(LinkStatus::Connecting)).await;

        // The cancel arm lets stop() unblock a pending handshake.
        let connected = tokio::select! {
            _ = cancel.cancelled() => {
                set_state(&state, ConnectionState::Closed).await;
                return;
            }
            result = LinkSession::connect(&endpoint, events.clone()) => result,
        };

        match connected {
            Ok(session) => {
                failures = 0;
                info!(endpoint = %endpoint, "link open");
                let done = session.done_signal();
                // Session goes into the slot before the status event so a
                // caller reacting to Connected can send immediately.
                *session_slot.lock().await = Some(session);
                set_state(&state, ConnectionState::Open).await;
                let _ = events.send(LinkEvent::Status(LinkStatus::Connected)).await;

                tokio::select! {
                    _ = cancel.cancelled() => {
                        set_state(&state, ConnectionState::Closing).await;
                        if let Some(session) = session_slot.lock().await.take() {
                            session.close();
                        }
                        set_state(&state, ConnectionState::Closed).await;
                        return;
                    }
                    _ = done.cancelled() => {
                        // Remote death; the read pump emitted Disconnected.
                        session_slot.lock().await.take();
                        set_state(&state, ConnectionState::Closed).await;
                    }
                }
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "connect failed");
                set_state(&state, ConnectionState::Failed(e.fail_reason())).await;
                let _ = events
                    .send(LinkEvent::Status(LinkStatus::Error(e.fail_reason())))
                    .await;

                failures = failures.saturating_add(1);
                if !policy.allows(failures) {
                    info!(attempts = failures, "retry budget exhausted, parking link");
                    set_state(&state, ConnectionState::Closed).await;
                    let _ = events
                        .send(LinkEvent::Status(LinkStatus::Disconnected))
                        .await;
                    return;
                }
            }
        }

        let delay = policy.delay_for_attempt(failures.max(1));
        debug!(
            delay_secs = format_args!("{:.2}", delay.as_secs_f64()),
            failures, "retrying"
        );
        tokio::select! {
            _ = cancel.cancelled() => {
                set_state(&state, ConnectionState::Closed).await;
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn set_state(state: &Arc<RwLock<ConnectionState>>, next: ConnectionState) {
    *state.write().await = next;
    debug!(state = ?next, "link state");
}

//! The send lifecycle: one outbound request, one response turn.
//!
//! [`run_session`] owns the backend side of the console. The frontend
//! appends the user turn at submit time and hands the message over an
//! mpsc channel; this loop performs the single round trip and appends
//! exactly one reply turn or error turn per message.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::{ChatClient, ClientError};
use crate::console::{
    BackendHealth, ConsoleState, push_error_turn, push_reply_turn, quit_requested,
    set_backend_health, set_finished, set_in_flight,
};

/// Error notice for non-2xx responses. `{}` is the HTTP status code.
fn server_error_notice(status: u16) -> String {
    format!("Server error ({status}).")
}

/// Error notice for transport failures.
pub const UNREACHABLE_NOTICE: &str =
    "Could not reach the server. Make sure the backend is running.";

/// Error notice for undecodable response bodies.
pub const BAD_REPLY_NOTICE: &str = "The server sent a reply this console could not read.";

/// Channel capacity for outbound messages.
///
/// One slot: the frontend's in-flight guard rejects submits while a
/// request is pending, so the channel never needs to queue.
pub const OUTBOUND_CAPACITY: usize = 1;

/// Create the outbound channel between a frontend and [`run_session`].
pub fn outbound_channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(OUTBOUND_CAPACITY)
}

/// Run the session loop until the outbound channel closes or the user
/// requests quit.
///
/// Per message: mark in-flight, perform one `POST /chat`, append exactly
/// one response turn (reply or error), clear in-flight. A startup health
/// probe records [`BackendHealth`] for the status header; it never
/// blocks sending.
pub async fn run_session(
    client: ChatClient,
    state: Arc<Mutex<ConsoleState>>,
    mut outbound: mpsc::Receiver<String>,
) {
    probe_health(&client, &state).await;

    while let Some(message) = outbound.recv().await {
        if quit_requested(&state) {
            break;
        }

        set_in_flight(&state, true);

        match client.send(&message).await {
            Ok(reply) => {
                debug!(
                    "reply received: {} chars, intent={}",
                    reply.reply.chars().count(),
                    reply.intent.as_deref().unwrap_or("-")
                );
                push_reply_turn(&state, &reply);
            }
            Err(ClientError::Status(status)) => {
                warn!("chat request failed: HTTP {status}");
                push_error_turn(&state, &server_error_notice(status));
            }
            Err(err @ ClientError::Transport(_)) => {
                warn!("chat request failed: {err}");
                push_error_turn(&state, UNREACHABLE_NOTICE);
            }
            Err(err @ ClientError::Decode(_)) => {
                warn!("chat request failed: {err}");
                push_error_turn(&state, BAD_REPLY_NOTICE);
            }
        }

        set_in_flight(&state, false);
    }

    set_finished(&state);
}

/// Probe `GET /health` once and record the outcome.
async fn probe_health(client: &ChatClient, state: &Arc<Mutex<ConsoleState>>) {
    match client.health().await {
        Ok(health) if health.is_ok() => {
            info!("backend online at {}", client.base_url());
            set_backend_health(state, BackendHealth::Online);
        }
        Ok(health) => {
            warn!("backend reported status '{}'", health.status);
            set_backend_health(state, BackendHealth::Online);
        }
        Err(err) => {
            warn!("health probe failed: {err}");
            set_backend_health(state, BackendHealth::Unreachable);
        }
    }
}

//! Shared console state and types for the chat frontend.
//!
//! This module is the data model a frontend renders from. It has no
//! rendering dependencies.
//!
//! # Architecture
//!
//! ```text
//! Session loop ──writes──▶ Arc<Mutex<ConsoleState>> ◀──reads── TUI thread
//! ```
//!
//! The session loop (tokio task) writes round-trip outcomes into
//! [`ConsoleState`]; the TUI thread reads the same state to render.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::transcript::Transcript;
use crate::wire::ChatReply;

/// Maximum log lines kept in memory.
pub const MAX_LOG_LINES: usize = 2000;
/// Trim to this many when the cap is exceeded.
pub const LOG_TRIM_TO: usize = 1200;

// ── Backend Health ────────────────────────────────────────────────────

/// Result of the startup health probe, shown in the status header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendHealth {
    /// Probe has not completed yet.
    Unknown,
    Online,
    Unreachable,
}

impl BackendHealth {
    /// Short label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "probing",
            Self::Online => "online",
            Self::Unreachable => "unreachable",
        }
    }
}

// ── Log Types ─────────────────────────────────────────────────────────

/// A single log line captured from tracing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogLine {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

/// Log severity level (mirrors tracing levels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Short fixed-width label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warn => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

// ── ConsoleState ──────────────────────────────────────────────────────

/// Console state shared between the session loop and a frontend.
///
/// Protected by a `Mutex`. The session loop writes round-trip outcomes;
/// the frontend reads them for rendering and writes user-side mutations
/// (user turns, clears, quit requests).
pub struct ConsoleState {
    /// The append-only chat transcript.
    pub transcript: Transcript,

    /// True while a request is in flight. The frontend renders a pending
    /// indicator and rejects further submits until it clears.
    pub in_flight: bool,

    /// Backend base URL, for the status header.
    pub endpoint: String,
    /// Startup health probe outcome.
    pub backend: BackendHealth,
    /// Completed round trips (reply or error) this session.
    pub sends: u32,

    /// Tracing log capture.
    pub logs: Vec<LogLine>,

    /// Set to `false` when the session loop exits.
    pub running: bool,
    /// The frontend sets this to `true` when the user requests quit.
    pub quit_requested: bool,
}

impl ConsoleState {
    /// Create console state for a backend endpoint, seeding the greeting.
    pub fn new(endpoint: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::new(greeting),
            in_flight: false,
            endpoint: endpoint.into(),
            backend: BackendHealth::Unknown,
            sends: 0,
            logs: Vec::new(),
            running: true,
            quit_requested: false,
        }
    }
}

// ── Convenience Updaters ──────────────────────────────────────────────

/// Lock the shared state mutex and run a closure on the guard.
/// Silently ignores poisoned locks (no log spam inside frontends).
macro_rules! with_state {
    ($state:expr, |$s:ident| $body:block) => {
        if let Ok(mut $s) = $state.lock() {
            $body
        }
    };
}

/// Append a user turn.
pub fn push_user_turn(state: &Arc<Mutex<ConsoleState>>, text: &str) {
    with_state!(state, |s| { s.transcript.push_user(text) });
}

/// Append the reply turn for a completed round trip.
pub fn push_reply_turn(state: &Arc<Mutex<ConsoleState>>, reply: &ChatReply) {
    with_state!(state, |s| {
        s.transcript.push_reply(reply);
        s.sends += 1;
    });
}

/// Append an error turn for a failed round trip.
pub fn push_error_turn(state: &Arc<Mutex<ConsoleState>>, text: &str) {
    with_state!(state, |s| {
        s.transcript.push_error(text);
        s.sends += 1;
    });
}

/// Clear the transcript and reseed the greeting.
pub fn clear_transcript(state: &Arc<Mutex<ConsoleState>>) {
    with_state!(state, |s| { s.transcript.clear() });
}

/// Mark a request as started or finished.
pub fn set_in_flight(state: &Arc<Mutex<ConsoleState>>, in_flight: bool) {
    with_state!(state, |s| { s.in_flight = in_flight });
}

/// Record the health probe outcome.
pub fn set_backend_health(state: &Arc<Mutex<ConsoleState>>, health: BackendHealth) {
    with_state!(state, |s| { s.backend = health });
}

/// Mark the session loop as finished.
pub fn set_finished(state: &Arc<Mutex<ConsoleState>>) {
    with_state!(state, |s| { s.running = false });
}

/// Whether the user has requested quit.
pub fn quit_requested(state: &Arc<Mutex<ConsoleState>>) -> bool {
    state.lock().map(|s| s.quit_requested).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Turn;

    #[test]
    fn log_level_labels() {
        assert_eq!(LogLevel::Info.label(), "INFO ");
        assert_eq!(LogLevel::Error.label(), "ERROR");
        assert_eq!(LogLevel::Warn.label(), "WARN ");
    }

    #[test]
    fn backend_health_labels() {
        assert_eq!(BackendHealth::Unknown.label(), "probing");
        assert_eq!(BackendHealth::Online.label(), "online");
        assert_eq!(BackendHealth::Unreachable.label(), "unreachable");
    }

    #[test]
    fn new_state_defaults() {
        let s = ConsoleState::new("http://127.0.0.1:8000", "Hi.");
        assert!(s.running);
        assert!(!s.quit_requested);
        assert!(!s.in_flight);
        assert_eq!(s.backend, BackendHealth::Unknown);
        assert_eq!(s.sends, 0);
        assert_eq!(s.transcript.len(), 1, "greeting is seeded");
    }

    #[test]
    fn updaters_mutate_under_lock() {
        let state = Arc::new(Mutex::new(ConsoleState::new("http://x", "Hi.")));

        push_user_turn(&state, "hello");
        set_in_flight(&state, true);
        push_reply_turn(
            &state,
            &ChatReply {
                reply: "hello back".into(),
                intent: None,
                matched: None,
                score: None,
            },
        );
        set_in_flight(&state, false);

        let s = state.lock().unwrap();
        assert_eq!(s.transcript.len(), 3);
        assert_eq!(s.sends, 1);
        assert!(!s.in_flight);
        assert!(matches!(s.transcript.turns()[1], Turn::User(_)));
        assert!(matches!(s.transcript.turns()[2], Turn::Reply { .. }));
    }

    #[test]
    fn error_turn_counts_as_a_send() {
        let state = Arc::new(Mutex::new(ConsoleState::new("http://x", "Hi.")));
        push_error_turn(&state, "Server error (503).");

        let s = state.lock().unwrap();
        assert_eq!(s.sends, 1);
        assert!(matches!(s.transcript.turns()[1], Turn::Error(_)));
    }

    #[test]
    fn clear_resets_transcript_but_not_counters() {
        let state = Arc::new(Mutex::new(ConsoleState::new("http://x", "Hi.")));
        push_user_turn(&state, "hello");
        push_error_turn(&state, "boom");
        clear_transcript(&state);

        let s = state.lock().unwrap();
        assert_eq!(s.transcript.len(), 1);
        assert_eq!(s.sends, 1, "send count survives a clear");
    }

    #[test]
    fn quit_requested_reads_flag() {
        let state = Arc::new(Mutex::new(ConsoleState::new("http://x", "Hi.")));
        assert!(!quit_requested(&state));
        state.lock().unwrap().quit_requested = true;
        assert!(quit_requested(&state));
    }
}

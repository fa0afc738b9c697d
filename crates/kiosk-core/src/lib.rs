//! Core library for the kiosk chat console.
//!
//! A kiosk session is a thin client over a remote chat backend: an
//! append-only [`Transcript`](transcript::Transcript) of rendered turns,
//! a [`ChatClient`](client::ChatClient) that performs one HTTP round
//! trip per user message, and a [`run_session`](session::run_session)
//! loop that turns each outbound message into exactly one response turn
//! (reply or error). Frontends render from a shared
//! [`ConsoleState`](console::ConsoleState).
//!
//! The backend contract (`POST /chat`, `GET /health`) lives in [`wire`];
//! everything else in this crate is presentation lifecycle.
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//!
//! use kiosk_core::client::ChatClient;
//! use kiosk_core::console::ConsoleState;
//! use kiosk_core::session::{outbound_channel, run_session};
//! use kiosk_core::transcript::DEFAULT_GREETING;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ChatClient::new("http://127.0.0.1:8000", Duration::from_secs(30)).unwrap();
//!     let state = Arc::new(Mutex::new(ConsoleState::new(
//!         client.base_url(),
//!         DEFAULT_GREETING,
//!     )));
//!     let (tx, rx) = outbound_channel();
//!
//!     // Hand `state` and `tx` to a frontend, then:
//!     run_session(client, state, rx).await;
//! }
//! ```

pub mod client;
pub mod console;
pub mod session;
pub mod trace_buffer;
pub mod transcript;
pub mod wire;

pub use client::{ChatClient, ClientError};
pub use console::{BackendHealth, ConsoleState, LogLevel, LogLine};
pub use trace_buffer::{LogBuffer, TraceCaptureLayer};
pub use transcript::{ReplyMeta, Transcript, Turn};
pub use wire::{ChatReply, ChatRequest, HealthReply};

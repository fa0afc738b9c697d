//! Wire types for the chat backend contract.
//!
//! The backend is an external collaborator with two endpoints:
//!
//! - `POST /chat` — accepts [`ChatRequest`], returns [`ChatReply`] on
//!   success or a non-2xx status on failure.
//! - `GET /health` — returns [`HealthReply`].
//!
//! Deserialization is lenient: optional fields default to `None` and
//! unknown fields are ignored (real backends attach extras such as a
//! routing `mode` alongside the contract fields).

use serde::{Deserialize, Serialize};

/// Request body for `POST /chat`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body from `POST /chat`.
///
/// Only `reply` is guaranteed; the metadata fields are present when the
/// backend routed the message through a matcher that produces them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The assistant's reply text. May be empty.
    #[serde(default)]
    pub reply: String,

    /// Routing intent (e.g. `"FAQ"`). Gates the metadata line in the UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    /// The rule or question pattern the message matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,

    /// Match confidence in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Response body from `GET /health`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthReply {
    #[serde(default)]
    pub status: String,
}

impl HealthReply {
    /// Whether the backend reported itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

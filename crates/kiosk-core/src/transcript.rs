//! The chat transcript: an append-only list of rendered turns.
//!
//! The transcript's contract is deliberately narrow: turns are appended
//! by the send lifecycle and never removed or reordered, except by
//! [`Transcript::clear`], which empties the list and reseeds the
//! greeting. Exactly one response turn (reply or error) follows each
//! user turn.

use serde::{Deserialize, Serialize};

use crate::wire::ChatReply;

/// Seed greeting shown on start and after every clear.
pub const DEFAULT_GREETING: &str =
    "Hello. I can help with account FAQs (sign-in, OTP codes, password resets) \
     and knowledge-base lookups.";

/// Placeholder rendered when the backend replies with empty text.
pub const NO_RESPONSE_PLACEHOLDER: &str = "(no response)";

/// A single rendered turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Turn {
    /// A message the user sent.
    User(String),
    /// A reply from the backend, with optional routing metadata.
    Reply {
        text: String,
        meta: Option<ReplyMeta>,
    },
    /// A user-visible failure notice appended instead of a reply turn.
    Error(String),
    /// The seed greeting.
    Notice(String),
}

impl Turn {
    /// Whether this turn was produced by a send (reply or error), as
    /// opposed to user input or the seed greeting.
    pub fn is_response(&self) -> bool {
        matches!(self, Turn::Reply { .. } | Turn::Error(_))
    }
}

/// Routing metadata attached to a reply.
///
/// Present only when the backend's `intent` field is present and
/// non-empty; `matched` and `score` decorate the label when they exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplyMeta {
    pub intent: String,
    pub matched: Option<String>,
    pub score: Option<f64>,
}

impl ReplyMeta {
    /// Extract metadata from a wire reply, or `None` when the reply
    /// carries no intent.
    pub fn from_reply(reply: &ChatReply) -> Option<Self> {
        let intent = reply.intent.as_deref().filter(|s| !s.is_empty())?;
        Some(Self {
            intent: intent.to_string(),
            matched: reply.matched.clone().filter(|s| !s.is_empty()),
            score: reply.score,
        })
    }

    /// One-line display label: `Mode: FAQ • Match: … • Score: 0.82`.
    ///
    /// A score of zero still renders; only an absent score is skipped.
    pub fn label(&self) -> String {
        let mut label = format!("Mode: {}", self.intent);
        if let Some(ref matched) = self.matched {
            label.push_str(&format!(" \u{2022} Match: {matched}"));
        }
        if let Some(score) = self.score {
            label.push_str(&format!(" \u{2022} Score: {score:.2}"));
        }
        label
    }
}

/// Append-only, in-memory list of chat turns.
#[derive(Clone, Debug)]
pub struct Transcript {
    greeting: String,
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create a transcript seeded with one greeting turn.
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        let turns = vec![Turn::Notice(greeting.clone())];
        Self { greeting, turns }
    }

    /// Append a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::User(text.into()));
    }

    /// Append the reply turn for a wire response.
    ///
    /// Empty reply text renders as [`NO_RESPONSE_PLACEHOLDER`].
    pub fn push_reply(&mut self, reply: &ChatReply) {
        let text = if reply.reply.is_empty() {
            NO_RESPONSE_PLACEHOLDER.to_string()
        } else {
            reply.reply.clone()
        };
        self.turns.push(Turn::Reply {
            text,
            meta: ReplyMeta::from_reply(reply),
        });
    }

    /// Append an error turn.
    pub fn push_error(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::Error(text.into()));
    }

    /// Empty the turn list and reseed the greeting.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::Notice(self.greeting.clone()));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(text: &str) -> ChatReply {
        ChatReply {
            reply: text.to_string(),
            intent: None,
            matched: None,
            score: None,
        }
    }

    #[test]
    fn new_transcript_seeds_greeting() {
        let t = Transcript::new("Welcome.");
        assert_eq!(t.turns(), &[Turn::Notice("Welcome.".into())]);
    }

    #[test]
    fn turns_append_in_order() {
        let mut t = Transcript::new("Hi.");
        t.push_user("forgot my password");
        t.push_reply(&reply("Reset it from the sign-in page."));

        assert_eq!(t.len(), 3);
        assert_eq!(t.turns()[1], Turn::User("forgot my password".into()));
        assert_eq!(
            t.turns()[2],
            Turn::Reply {
                text: "Reset it from the sign-in page.".into(),
                meta: None,
            }
        );
    }

    #[test]
    fn clear_reseeds_greeting() {
        let mut t = Transcript::new("Hi.");
        t.push_user("hello");
        t.push_reply(&reply("hello back"));
        t.clear();

        assert_eq!(t.turns(), &[Turn::Notice("Hi.".into())]);
    }

    #[test]
    fn empty_reply_text_renders_placeholder() {
        let mut t = Transcript::new("Hi.");
        t.push_reply(&reply(""));
        assert_eq!(
            t.turns()[1],
            Turn::Reply {
                text: NO_RESPONSE_PLACEHOLDER.into(),
                meta: None,
            }
        );
    }

    #[test]
    fn meta_requires_non_empty_intent() {
        let mut r = reply("ok");
        r.score = Some(0.9);
        assert!(ReplyMeta::from_reply(&r).is_none(), "no intent, no meta");

        r.intent = Some(String::new());
        assert!(ReplyMeta::from_reply(&r).is_none(), "empty intent, no meta");

        r.intent = Some("FAQ".into());
        let meta = ReplyMeta::from_reply(&r).unwrap();
        assert_eq!(meta.intent, "FAQ");
        assert_eq!(meta.score, Some(0.9));
    }

    #[test]
    fn meta_label_full() {
        let meta = ReplyMeta {
            intent: "FAQ".into(),
            matched: Some("forgot password sso".into()),
            score: Some(0.8172),
        };
        assert_eq!(
            meta.label(),
            "Mode: FAQ \u{2022} Match: forgot password sso \u{2022} Score: 0.82"
        );
    }

    #[test]
    fn meta_label_skips_absent_segments() {
        let meta = ReplyMeta {
            intent: "FAQ".into(),
            matched: None,
            score: None,
        };
        assert_eq!(meta.label(), "Mode: FAQ");
    }

    #[test]
    fn meta_label_renders_zero_score() {
        let meta = ReplyMeta {
            intent: "FAQ".into(),
            matched: None,
            score: Some(0.0),
        };
        assert_eq!(meta.label(), "Mode: FAQ \u{2022} Score: 0.00");
    }

    #[test]
    fn empty_matched_is_dropped_from_meta() {
        let r = ChatReply {
            reply: "ok".into(),
            intent: Some("FAQ".into()),
            matched: Some(String::new()),
            score: None,
        };
        let meta = ReplyMeta::from_reply(&r).unwrap();
        assert!(meta.matched.is_none());
    }

    #[test]
    fn response_turn_classification() {
        assert!(
            Turn::Reply {
                text: "x".into(),
                meta: None
            }
            .is_response()
        );
        assert!(Turn::Error("x".into()).is_response());
        assert!(!Turn::User("x".into()).is_response());
        assert!(!Turn::Notice("x".into()).is_response());
    }
}

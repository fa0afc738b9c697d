//! Tracing subscriber layer that captures log events into a
//! [`LogBuffer`] for later draining into [`ConsoleState`](crate::console::ConsoleState).
//!
//! The buffer uses a separate mutex from `ConsoleState`, so logging from
//! the session loop never contends with the frontend's render lock.

use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::Subscriber;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::registry::LookupSpan;

use crate::console::{ConsoleState, LOG_TRIM_TO, LogLevel, LogLine, MAX_LOG_LINES};

/// A shared buffer of pending log lines.
///
/// The tracing layer pushes into this buffer; the frontend drains it
/// once per frame and merges the entries into `ConsoleState::logs`.
#[derive(Clone)]
pub struct LogBuffer(Arc<Mutex<Vec<LogLine>>>);

impl LogBuffer {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::with_capacity(128))))
    }

    /// Drain all pending log lines from the buffer, returning them.
    pub fn drain(&self) -> Vec<LogLine> {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *buf)
    }

    /// Drain pending log lines directly into `ConsoleState::logs`,
    /// respecting the configured trim limits.
    ///
    /// Acquires the `ConsoleState` lock only if there are new lines.
    pub fn flush_into(&self, state: &Arc<Mutex<ConsoleState>>) {
        let lines = self.drain();
        if lines.is_empty() {
            return;
        }
        if let Ok(mut s) = state.lock() {
            s.logs.extend(lines);
            if s.logs.len() > MAX_LOG_LINES {
                let trim_to = s.logs.len() - LOG_TRIM_TO;
                s.logs.drain(..trim_to);
            }
        }
    }
}

/// A [`tracing_subscriber::Layer`] that captures log events into a
/// [`LogBuffer`] so a frontend can render them.
pub struct TraceCaptureLayer {
    buffer: LogBuffer,
}

impl TraceCaptureLayer {
    /// Create the layer and its associated [`LogBuffer`].
    pub fn new() -> (Self, LogBuffer) {
        let buffer = LogBuffer::new();
        (
            Self {
                buffer: buffer.clone(),
            },
            buffer,
        )
    }
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for TraceCaptureLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let level = match *event.metadata().level() {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        };

        let mut message = visitor.message;
        if !visitor.fields.is_empty() {
            let extras: Vec<String> = visitor
                .fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            if message.is_empty() {
                message = extras.join(" ");
            } else {
                message = format!("{message} {{{}}}", extras.join(", "));
            }
        }

        let line = LogLine {
            time: Local::now().format("%H:%M:%S").to_string(),
            level,
            message,
        };

        // Lock only the log buffer, never the console state, so log
        // calls can never block on the render thread.
        if let Ok(mut buf) = self.buffer.0.lock() {
            buf.push(line);
            // Cap the buffer so a burst of logs before the next drain
            // doesn't consume unbounded memory.
            if buf.len() > MAX_LOG_LINES {
                let trim_to = buf.len() - LOG_TRIM_TO;
                buf.drain(..trim_to);
            }
        }
    }
}

/// Visitor that extracts the message and extra fields from an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_buffer() {
        let (_layer, buffer) = TraceCaptureLayer::new();
        assert!(buffer.drain().is_empty());

        buffer.0.lock().unwrap().push(LogLine {
            time: "12:00:00".into(),
            level: LogLevel::Info,
            message: "hello".into(),
        });

        let drained = buffer.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].message, "hello");
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn flush_into_merges_and_trims() {
        let (_layer, buffer) = TraceCaptureLayer::new();
        let state = Arc::new(Mutex::new(ConsoleState::new("http://x", "Hi.")));

        {
            let mut buf = buffer.0.lock().unwrap();
            for i in 0..(MAX_LOG_LINES + 10) {
                buf.push(LogLine {
                    time: "12:00:00".into(),
                    level: LogLevel::Debug,
                    message: format!("line {i}"),
                });
            }
        }
        // The layer's own cap trims bursts before a drain; emulate a
        // frontend that flushed an over-cap backlog anyway.
        buffer.flush_into(&state);

        let s = state.lock().unwrap();
        assert!(s.logs.len() <= MAX_LOG_LINES);
        assert!(!s.logs.is_empty());
    }

    #[test]
    fn flush_into_skips_lock_when_empty() {
        let (_layer, buffer) = TraceCaptureLayer::new();
        let state = Arc::new(Mutex::new(ConsoleState::new("http://x", "Hi.")));
        buffer.flush_into(&state);
        assert!(state.lock().unwrap().logs.is_empty());
    }
}

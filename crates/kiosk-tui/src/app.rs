//! TUI-local state (not shared with the session loop).

use std::time::{Duration, Instant};

/// How long a toast stays on screen.
pub(crate) const TOAST_TTL: Duration = Duration::from_millis(1800);

/// Input mode for the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputMode {
    /// Default mode — typing edits the input buffer, Enter submits.
    Compose,
    /// Navigation mode — single-key commands, arrow keys scroll.
    Browse,
    /// Quick prompt picker — arrow keys navigate, Enter sends.
    QuickPick,
}

/// Which pane currently receives scroll input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActivePane {
    Transcript,
    Logs,
}

/// A transient status message shown in the input bar title.
pub(crate) struct Toast {
    pub(crate) text: String,
    pub(crate) expires_at: Instant,
}

/// TUI-local state (not shared with the session loop).
pub(crate) struct App {
    pub(crate) input_mode: InputMode,
    pub(crate) input_buffer: String,
    /// Which pane is focused for scrolling (toggled with Tab).
    pub(crate) active_pane: ActivePane,
    /// Whether the logs pane is visible (toggled with `,` in Browse).
    pub(crate) show_logs: bool,
    /// Offset from the bottom of the transcript (0 = follow tail).
    pub(crate) transcript_scroll: usize,
    /// Offset from the bottom of the log (0 = follow tail).
    pub(crate) log_scroll: usize,
    pub(crate) toast: Option<Toast>,
    pub(crate) should_quit: bool,
    /// Currently highlighted entry in quick-pick mode.
    pub(crate) quick_cursor: usize,
    pub(crate) quick_prompts: Vec<String>,
}

impl App {
    pub(crate) fn new(quick_prompts: Vec<String>) -> Self {
        Self {
            input_mode: InputMode::Compose,
            input_buffer: String::new(),
            active_pane: ActivePane::Transcript,
            show_logs: false,
            transcript_scroll: 0,
            log_scroll: 0,
            toast: None,
            should_quit: false,
            quick_cursor: 0,
            quick_prompts,
        }
    }

    /// Show a transient toast for [`TOAST_TTL`].
    pub(crate) fn show_toast(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast {
            text: text.into(),
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    /// Drop the toast once its deadline has passed. Called each frame.
    pub(crate) fn expire_toast(&mut self) {
        if let Some(ref toast) = self.toast
            && Instant::now() >= toast.expires_at
        {
            self.toast = None;
        }
    }

    pub(crate) fn toast_text(&self) -> Option<&str> {
        self.toast.as_ref().map(|t| t.text.as_str())
    }
}

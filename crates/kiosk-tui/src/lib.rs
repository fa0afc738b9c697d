//! Terminal frontend for the kiosk chat console.
//!
//! Provides a ready-to-use TUI (ratatui + crossterm) that renders the
//! shared [`ConsoleState`] from `kiosk-core` and hands submitted
//! messages to the session loop over an mpsc channel.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::{Arc, Mutex};
//! use kiosk_core::console::ConsoleState;
//! use kiosk_core::session::outbound_channel;
//! use kiosk_tui::TuiConfig;
//!
//! let state = Arc::new(Mutex::new(ConsoleState::new("http://127.0.0.1:8000", "Hi.")));
//! let (tx, rx) = outbound_channel();
//! let handle = kiosk_tui::spawn_tui(state.clone(), tx, TuiConfig::default());
//! // ... run the session loop with `rx`, then ...
//! handle.join().unwrap();
//! ```

use std::io;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use kiosk_core::console::ConsoleState;
use kiosk_core::trace_buffer::LogBuffer;
use ratatui::prelude::*;
use tokio::sync::mpsc;

mod app;
mod input;
mod render;

pub use render::{health_style, log_level_style, truncate_str};

use app::App;
use input::handle_key_event;
use render::render;

/// Built-in quick prompts (the helpdesk topics the backend covers).
pub const DEFAULT_QUICK_PROMPTS: &[&str] = &[
    "How do I reset my SSO password?",
    "I did not receive my OTP code.",
    "How do I unlock my account?",
    "How do I update my registered email?",
];

/// Configuration for the TUI.
pub struct TuiConfig {
    /// Canned prompts offered by the quick-pick mode.
    pub quick_prompts: Vec<String>,
    /// Optional log buffer from the tracing layer.
    ///
    /// When set, the TUI drains pending log lines from this buffer once
    /// per frame and merges them into `ConsoleState::logs`. This keeps
    /// the tracing layer's `on_event` completely decoupled from the
    /// state lock, preventing log calls from blocking the render thread.
    pub log_buffer: Option<LogBuffer>,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            quick_prompts: DEFAULT_QUICK_PROMPTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            log_buffer: None,
        }
    }
}

/// Spawn the TUI on a dedicated OS thread.
///
/// The TUI runs until the user quits; dropping `outbound` on exit closes
/// the session loop's channel, which ends the session.
pub fn spawn_tui(
    state: Arc<Mutex<ConsoleState>>,
    outbound: mpsc::Sender<String>,
    config: TuiConfig,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = run_tui(state, outbound, &config) {
            eprintln!("TUI error: {e}");
        }
    })
}

/// Run the TUI event loop (blocking). Call this from a dedicated OS
/// thread.
///
/// Returns when the user quits (Ctrl+C anywhere, `q` in browse mode) or
/// when `quit_requested` is set from outside.
pub fn run_tui(
    state: Arc<Mutex<ConsoleState>>,
    outbound: mpsc::Sender<String>,
    config: &TuiConfig,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new(config.quick_prompts.clone());

    loop {
        // Check if we should exit.
        let quit = {
            let s = state.lock().unwrap();
            s.quit_requested
        };
        if app.should_quit || quit {
            state.lock().unwrap().quit_requested = true;
            break;
        }

        // Flush pending log lines from the tracing layer before
        // rendering. Acquires the state lock briefly and only when
        // there are new lines.
        if let Some(ref log_buf) = config.log_buffer {
            log_buf.flush_into(&state);
        }

        app.expire_toast();

        // Render.
        terminal.draw(|frame| {
            render(frame, &state, &app);
        })?;

        // Poll for input events (100ms timeout for responsive rendering).
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            handle_key_event(key, &mut app, &state, &outbound);
        }
    }

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    terminal.show_cursor()?;
    Ok(())
}

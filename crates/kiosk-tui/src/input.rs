//! Input handling for the chat console.

use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyModifiers};
use kiosk_core::console::{ConsoleState, clear_transcript};
use tokio::sync::mpsc;

use crate::app::{ActivePane, App, InputMode};

pub(crate) fn handle_key_event(
    key: crossterm::event::KeyEvent,
    app: &mut App,
    state: &Arc<Mutex<ConsoleState>>,
    outbound: &mpsc::Sender<String>,
) {
    // Ctrl+C always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Compose => handle_compose_key(key, app, state, outbound),
        InputMode::Browse => handle_browse_key(key, app, state),
        InputMode::QuickPick => handle_quick_pick_key(key, app, state, outbound),
    }
}

fn handle_compose_key(
    key: crossterm::event::KeyEvent,
    app: &mut App,
    state: &Arc<Mutex<ConsoleState>>,
    outbound: &mpsc::Sender<String>,
) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('l') => clear_chat(app, state),
            KeyCode::Char('p') => open_quick_pick(app),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => {
            let text = app.input_buffer.clone();
            submit(text, app, state, outbound);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Browse;
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => {
            app.input_buffer.push(c);
        }
        // Pass through navigation keys so the user can scroll and
        // switch panes while typing.
        KeyCode::Up => {
            let scroll = active_scroll_mut(app);
            *scroll = scroll.saturating_add(3);
        }
        KeyCode::Down => {
            let scroll = active_scroll_mut(app);
            *scroll = scroll.saturating_sub(3);
        }
        KeyCode::PageUp => {
            let scroll = active_scroll_mut(app);
            *scroll = scroll.saturating_add(20);
        }
        KeyCode::PageDown => {
            let scroll = active_scroll_mut(app);
            *scroll = scroll.saturating_sub(20);
        }
        KeyCode::End => {
            *active_scroll_mut(app) = 0; // follow tail
        }
        KeyCode::Tab | KeyCode::BackTab => switch_pane(app),
        _ => {}
    }
}

fn handle_browse_key(
    key: crossterm::event::KeyEvent,
    app: &mut App,
    state: &Arc<Mutex<ConsoleState>>,
) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Compose;
        }
        KeyCode::Char(',') => {
            app.show_logs = !app.show_logs;
            if app.show_logs {
                app.active_pane = ActivePane::Logs;
            } else {
                app.active_pane = ActivePane::Transcript;
            }
        }
        KeyCode::Char('c') => clear_chat(app, state),
        KeyCode::Char('p') => open_quick_pick(app),
        KeyCode::Up | KeyCode::Char('k') => {
            let scroll = active_scroll_mut(app);
            *scroll = scroll.saturating_add(3);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let scroll = active_scroll_mut(app);
            *scroll = scroll.saturating_sub(3);
        }
        KeyCode::PageUp => {
            let scroll = active_scroll_mut(app);
            *scroll = scroll.saturating_add(20);
        }
        KeyCode::PageDown => {
            let scroll = active_scroll_mut(app);
            *scroll = scroll.saturating_sub(20);
        }
        KeyCode::End => {
            *active_scroll_mut(app) = 0;
        }
        KeyCode::Tab | KeyCode::BackTab => switch_pane(app),
        _ => {}
    }
}

fn handle_quick_pick_key(
    key: crossterm::event::KeyEvent,
    app: &mut App,
    state: &Arc<Mutex<ConsoleState>>,
    outbound: &mpsc::Sender<String>,
) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.quick_cursor = app.quick_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.quick_cursor + 1 < app.quick_prompts.len() {
                app.quick_cursor += 1;
            }
        }
        KeyCode::Enter => {
            let prompt = app.quick_prompts.get(app.quick_cursor).cloned();
            app.input_mode = InputMode::Compose;
            if let Some(prompt) = prompt {
                submit(prompt, app, state, outbound);
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Compose;
        }
        _ => {}
    }
}

/// Returns a mutable reference to the scroll offset of the active pane.
fn active_scroll_mut(app: &mut App) -> &mut usize {
    match app.active_pane {
        ActivePane::Transcript => &mut app.transcript_scroll,
        ActivePane::Logs => &mut app.log_scroll,
    }
}

fn switch_pane(app: &mut App) {
    if app.show_logs {
        app.active_pane = match app.active_pane {
            ActivePane::Transcript => ActivePane::Logs,
            ActivePane::Logs => ActivePane::Transcript,
        };
    }
}

fn open_quick_pick(app: &mut App) {
    if app.quick_prompts.is_empty() {
        return;
    }
    app.quick_cursor = 0;
    app.input_mode = InputMode::QuickPick;
}

fn clear_chat(app: &mut App, state: &Arc<Mutex<ConsoleState>>) {
    clear_transcript(state);
    app.transcript_scroll = 0;
    app.show_toast("Transcript cleared.");
}

/// Submit one message: append the user turn and hand the message to the
/// session loop.
///
/// Empty input is ignored. While a request is in flight further submits
/// are rejected with a toast and the input buffer is left intact, so
/// there is never more than one outstanding request.
fn submit(
    text: String,
    app: &mut App,
    state: &Arc<Mutex<ConsoleState>>,
    outbound: &mpsc::Sender<String>,
) {
    let text = text.trim().to_string();
    if text.is_empty() {
        return;
    }

    let Ok(mut s) = state.lock() else {
        return;
    };

    if s.in_flight {
        drop(s);
        app.show_toast("Still waiting for the previous reply.");
        return;
    }

    match outbound.try_send(text.clone()) {
        Ok(()) => {
            s.transcript.push_user(&text);
            s.in_flight = true;
            drop(s);
            app.input_buffer.clear();
            app.transcript_scroll = 0; // follow tail
        }
        Err(_) => {
            drop(s);
            app.show_toast("The session loop is not running.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use kiosk_core::session::outbound_channel;
    use kiosk_core::transcript::Turn;
    use tokio::sync::mpsc::Receiver;

    fn fixture() -> (
        App,
        Arc<Mutex<ConsoleState>>,
        mpsc::Sender<String>,
        Receiver<String>,
    ) {
        let app = App::new(vec!["Quick one".into(), "Quick two".into()]);
        let state = Arc::new(Mutex::new(ConsoleState::new("http://x", "Hi.")));
        let (tx, rx) = outbound_channel();
        (app, state, tx, rx)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_edits_the_buffer() {
        let (mut app, state, tx, _rx) = fixture();
        for c in "hi!".chars() {
            handle_key_event(press(KeyCode::Char(c)), &mut app, &state, &tx);
        }
        assert_eq!(app.input_buffer, "hi!");

        handle_key_event(press(KeyCode::Backspace), &mut app, &state, &tx);
        assert_eq!(app.input_buffer, "hi");
    }

    #[test]
    fn enter_submits_and_appends_user_turn() {
        let (mut app, state, tx, mut rx) = fixture();
        app.input_buffer = "  forgot my password  ".into();

        handle_key_event(press(KeyCode::Enter), &mut app, &state, &tx);

        assert_eq!(rx.try_recv().unwrap(), "forgot my password");
        assert!(app.input_buffer.is_empty());
        let s = state.lock().unwrap();
        assert!(s.in_flight);
        assert_eq!(
            s.transcript.turns()[1],
            Turn::User("forgot my password".into())
        );
    }

    #[test]
    fn enter_ignores_blank_input() {
        let (mut app, state, tx, mut rx) = fixture();
        app.input_buffer = "   ".into();

        handle_key_event(press(KeyCode::Enter), &mut app, &state, &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(state.lock().unwrap().transcript.len(), 1);
    }

    #[test]
    fn submit_is_rejected_while_in_flight() {
        let (mut app, state, tx, mut rx) = fixture();

        app.input_buffer = "first".into();
        handle_key_event(press(KeyCode::Enter), &mut app, &state, &tx);
        assert_eq!(rx.try_recv().unwrap(), "first");

        // The session loop has not answered yet; a second submit must
        // not go out and must not consume the buffer.
        app.input_buffer = "second".into();
        handle_key_event(press(KeyCode::Enter), &mut app, &state, &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(app.input_buffer, "second");
        assert_eq!(
            app.toast_text(),
            Some("Still waiting for the previous reply.")
        );
        assert_eq!(state.lock().unwrap().transcript.len(), 2, "one user turn");
    }

    #[test]
    fn ctrl_l_clears_and_toasts() {
        let (mut app, state, tx, _rx) = fixture();
        state.lock().unwrap().transcript.push_user("hello");

        handle_key_event(ctrl('l'), &mut app, &state, &tx);

        assert_eq!(state.lock().unwrap().transcript.len(), 1, "reseeded");
        assert_eq!(app.toast_text(), Some("Transcript cleared."));
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let (mut app, state, tx, _rx) = fixture();
        for mode in [InputMode::Compose, InputMode::Browse, InputMode::QuickPick] {
            app.should_quit = false;
            app.input_mode = mode;
            handle_key_event(ctrl('c'), &mut app, &state, &tx);
            assert!(app.should_quit, "ctrl+c must quit in {mode:?}");
        }
    }

    #[test]
    fn esc_enters_browse_and_i_returns() {
        let (mut app, state, tx, _rx) = fixture();

        handle_key_event(press(KeyCode::Esc), &mut app, &state, &tx);
        assert_eq!(app.input_mode, InputMode::Browse);

        // 'q' quits only from Browse.
        handle_key_event(press(KeyCode::Char('i')), &mut app, &state, &tx);
        assert_eq!(app.input_mode, InputMode::Compose);

        handle_key_event(press(KeyCode::Char('q')), &mut app, &state, &tx);
        assert!(!app.should_quit, "'q' types in compose mode");
        assert_eq!(app.input_buffer, "q");
    }

    #[test]
    fn browse_comma_toggles_logs_pane() {
        let (mut app, state, tx, _rx) = fixture();
        app.input_mode = InputMode::Browse;

        handle_key_event(press(KeyCode::Char(',')), &mut app, &state, &tx);
        assert!(app.show_logs);
        assert_eq!(app.active_pane, ActivePane::Logs);

        handle_key_event(press(KeyCode::Char(',')), &mut app, &state, &tx);
        assert!(!app.show_logs);
        assert_eq!(app.active_pane, ActivePane::Transcript);
    }

    #[test]
    fn quick_pick_navigation_is_bounded() {
        let (mut app, state, tx, _rx) = fixture();
        handle_key_event(ctrl('p'), &mut app, &state, &tx);
        assert_eq!(app.input_mode, InputMode::QuickPick);

        handle_key_event(press(KeyCode::Up), &mut app, &state, &tx);
        assert_eq!(app.quick_cursor, 0, "cannot move above the first entry");

        handle_key_event(press(KeyCode::Down), &mut app, &state, &tx);
        handle_key_event(press(KeyCode::Down), &mut app, &state, &tx);
        assert_eq!(app.quick_cursor, 1, "cannot move past the last entry");
    }

    #[test]
    fn quick_pick_enter_sends_selected_prompt() {
        let (mut app, state, tx, mut rx) = fixture();
        handle_key_event(ctrl('p'), &mut app, &state, &tx);
        handle_key_event(press(KeyCode::Down), &mut app, &state, &tx);
        handle_key_event(press(KeyCode::Enter), &mut app, &state, &tx);

        assert_eq!(rx.try_recv().unwrap(), "Quick two");
        assert_eq!(app.input_mode, InputMode::Compose);
        assert_eq!(
            state.lock().unwrap().transcript.turns()[1],
            Turn::User("Quick two".into())
        );
    }

    #[test]
    fn quick_pick_esc_cancels_without_sending() {
        let (mut app, state, tx, mut rx) = fixture();
        handle_key_event(ctrl('p'), &mut app, &state, &tx);
        handle_key_event(press(KeyCode::Esc), &mut app, &state, &tx);

        assert_eq!(app.input_mode, InputMode::Compose);
        assert!(rx.try_recv().is_err());
        assert_eq!(state.lock().unwrap().transcript.len(), 1);
    }

    #[test]
    fn quick_pick_needs_prompts() {
        let (mut app, state, tx, _rx) = fixture();
        app.quick_prompts.clear();
        handle_key_event(ctrl('p'), &mut app, &state, &tx);
        assert_eq!(app.input_mode, InputMode::Compose, "no prompts, no picker");
    }
}

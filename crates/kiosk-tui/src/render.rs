//! Rendering for the chat console.

use std::sync::{Arc, Mutex};

use kiosk_core::console::{BackendHealth, ConsoleState, LogLevel, LogLine};
use kiosk_core::transcript::Turn;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{ActivePane, App, InputMode};

// ── Public Utilities ──────────────────────────────────────────────────

/// Truncate a string to a maximum number of chars, appending "..." if
/// truncated.
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}

/// Map a log level to a ratatui [`Style`].
pub fn log_level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Trace => Style::default().fg(Color::DarkGray),
        LogLevel::Debug => Style::default().fg(Color::Cyan),
        LogLevel::Info => Style::default().fg(Color::Green),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

/// Map a backend health state to a ratatui [`Style`].
pub fn health_style(health: BackendHealth) -> Style {
    match health {
        BackendHealth::Unknown => Style::default().fg(Color::Yellow),
        BackendHealth::Online => Style::default().fg(Color::Green),
        BackendHealth::Unreachable => Style::default().fg(Color::Red),
    }
}

// ── Root Render ───────────────────────────────────────────────────────

/// Snapshot of `ConsoleState` fields needed for rendering.
///
/// Everything is cloned in one shot so the state lock is held only for
/// the clone duration, never during widget construction.
struct RenderSnapshot {
    turns: Vec<Turn>,
    in_flight: bool,
    endpoint: String,
    backend: BackendHealth,
    sends: u32,
    logs: Vec<LogLine>,
}

pub(crate) fn render(frame: &mut Frame, state: &Arc<Mutex<ConsoleState>>, app: &App) {
    let area = frame.area();

    // Outer layout: [4] header | [flex] middle | [3] input bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(area);

    let snap = {
        let s = state.lock().unwrap();
        RenderSnapshot {
            turns: s.transcript.turns().to_vec(),
            in_flight: s.in_flight,
            endpoint: s.endpoint.clone(),
            backend: s.backend,
            sends: s.sends,
            logs: if app.show_logs {
                s.logs.clone()
            } else {
                Vec::new()
            },
        }
        // lock released here
    };

    render_header(frame, chunks[0], &snap);
    render_input(frame, chunks[2], app);

    if matches!(app.input_mode, InputMode::QuickPick) {
        render_quick_pick(frame, chunks[1], app);
    } else if app.show_logs {
        let mid = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        render_transcript(frame, mid[0], &snap, app);
        render_logs(frame, mid[1], &snap.logs, app);
    } else {
        render_transcript(frame, chunks[1], &snap, app);
    }
}

// ── Header ────────────────────────────────────────────────────────────

fn render_header(frame: &mut Frame, area: Rect, snap: &RenderSnapshot) {
    let label_style = Style::default().fg(Color::DarkGray);
    let endpoint_width = area.width.saturating_sub(30).max(20) as usize;

    let mut line2 = vec![
        Span::styled("Turns: ", label_style),
        Span::styled(snap.turns.len().to_string(), Style::default().fg(Color::White)),
        Span::raw("   "),
        Span::styled("Sends: ", label_style),
        Span::styled(snap.sends.to_string(), Style::default().fg(Color::White)),
    ];
    if snap.in_flight {
        line2.push(Span::raw("   "));
        line2.push(Span::styled(
            "Sending\u{2026}",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let header_text = vec![
        Line::from(vec![
            Span::styled("Endpoint: ", label_style),
            Span::styled(
                truncate_str(&snap.endpoint, endpoint_width),
                Style::default().fg(Color::White),
            ),
            Span::raw("   "),
            Span::styled("Backend: ", label_style),
            Span::styled(snap.backend.label(), health_style(snap.backend)),
        ]),
        Line::from(line2),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" kiosk ");

    frame.render_widget(Paragraph::new(header_text).block(block), area);
}

// ── Transcript Pane ───────────────────────────────────────────────────

/// Build the transcript pane lines: one styled block per turn, a blank
/// separator after each, and a live pending line while a request is in
/// flight (the pending line is state, not a turn).
fn transcript_lines(turns: &[Turn], in_flight: bool) -> Vec<Line<'static>> {
    let user_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let reply_style = Style::default().fg(Color::White);
    let tag_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let meta_style = Style::default().fg(Color::DarkGray);
    let error_style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    let notice_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC);

    let mut lines: Vec<Line> = Vec::new();

    for turn in turns {
        match turn {
            Turn::User(text) => {
                for (i, line) in text.lines().enumerate() {
                    let prefix = if i == 0 { "> " } else { "  " };
                    lines.push(Line::from(vec![
                        Span::styled(prefix, user_style),
                        Span::styled(line.to_string(), user_style),
                    ]));
                }
            }
            Turn::Reply { text, meta } => {
                for (i, line) in text.lines().enumerate() {
                    if i == 0 {
                        lines.push(Line::from(vec![
                            Span::styled("KB ", tag_style),
                            Span::styled(line.to_string(), reply_style),
                        ]));
                    } else {
                        lines.push(Line::from(vec![
                            Span::raw("   "),
                            Span::styled(line.to_string(), reply_style),
                        ]));
                    }
                }
                if let Some(meta) = meta {
                    lines.push(Line::from(vec![
                        Span::raw("   "),
                        Span::styled(meta.label(), meta_style),
                    ]));
                }
            }
            Turn::Error(text) => {
                lines.push(Line::from(vec![
                    Span::styled("!! ", error_style),
                    Span::styled(text.clone(), error_style),
                ]));
            }
            Turn::Notice(text) => {
                for line in text.lines() {
                    lines.push(Line::from(Span::styled(line.to_string(), notice_style)));
                }
            }
        }
        lines.push(Line::from(""));
    }

    if in_flight {
        lines.push(Line::from(vec![
            Span::styled(
                "KB ",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("\u{2026}", Style::default().fg(Color::Yellow)),
        ]));
    }

    lines
}

fn render_transcript(frame: &mut Frame, area: Rect, snap: &RenderSnapshot, app: &App) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let lines = transcript_lines(&snap.turns, snap.in_flight);

    let total = lines.len();
    let scroll = if app.transcript_scroll == 0 {
        total.saturating_sub(inner_height)
    } else {
        total
            .saturating_sub(inner_height)
            .saturating_sub(app.transcript_scroll)
    };

    let border_color = if app.active_pane == ActivePane::Transcript {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Transcript ");

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll as u16, 0))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

// ── Log Pane ──────────────────────────────────────────────────────────

fn render_logs(frame: &mut Frame, area: Rect, logs: &[LogLine], app: &App) {
    let inner_height = area.height.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::with_capacity(logs.len());

    for log in logs {
        // Filter out trace-level logs — too noisy for the console.
        if matches!(log.level, LogLevel::Trace) {
            continue;
        }
        let time_span = Span::styled(
            format!("{} ", log.time),
            Style::default().fg(Color::DarkGray),
        );
        let level_span = Span::styled(
            format!("{} ", log.level.label()),
            log_level_style(log.level),
        );
        let msg_span = Span::raw(&log.message);
        lines.push(Line::from(vec![time_span, level_span, msg_span]));
    }

    let total = lines.len();
    let scroll = if app.log_scroll == 0 {
        total.saturating_sub(inner_height)
    } else {
        total
            .saturating_sub(inner_height)
            .saturating_sub(app.log_scroll)
    };

    let border_color = if app.active_pane == ActivePane::Logs {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Log ");

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll as u16, 0))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

// ── Quick Prompt Picker ───────────────────────────────────────────────

fn render_quick_pick(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    for (i, prompt) in app.quick_prompts.iter().enumerate() {
        let is_selected = i == app.quick_cursor;
        let marker = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(prompt.clone(), style),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Quick prompts ");

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

// ── Input Bar ─────────────────────────────────────────────────────────

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let (title, style) = if let Some(toast) = app.toast_text() {
        (format!(" {toast} "), Style::default().fg(Color::Yellow))
    } else {
        match app.input_mode {
            InputMode::Compose => {
                let char_count = app.input_buffer.chars().count();
                (
                    format!(
                        " Type your message ({char_count} chars) \u{2014} [Enter] send  [Esc] browse "
                    ),
                    Style::default().fg(Color::Green),
                )
            }
            InputMode::Browse => (
                " [i] compose  [q] quit  [,] logs  [c] clear  [p] quick prompts ".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            InputMode::QuickPick => (
                " [Up/Down] navigate  [Enter] send  [Esc] cancel ".to_string(),
                Style::default().fg(Color::Yellow),
            ),
        }
    };

    let input_text = match app.input_mode {
        InputMode::Compose => format!("> {}\u{2588}", app.input_buffer),
        InputMode::Browse | InputMode::QuickPick => String::new(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title);

    frame.render_widget(Paragraph::new(input_text).block(block), area);
}

// ── Tests ─────────────────────────────────────────────────────────────

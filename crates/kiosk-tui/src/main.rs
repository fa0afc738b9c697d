//! Terminal chat console for a helpdesk knowledge-base backend.
//!
//! Connects to a backend exposing `POST /chat` and `GET /health`,
//! renders the conversation in a TUI, and sends one request per
//! submitted message.
//!
//! # Examples
//!
//! ```sh
//! # Interactive console against a local backend
//! kiosk
//!
//! # Point at another backend
//! kiosk --endpoint http://10.1.4.20:8000
//!
//! # One-shot mode: send a single message and print the reply
//! kiosk --message "How do I reset my SSO password?"
//!
//! # Custom greeting and quick prompts
//! kiosk --greeting "Ask me about licensing." \
//!   --quick "How do I renew?" --quick "Where is my invoice?"
//! ```

use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use kiosk_core::client::ChatClient;
use kiosk_core::console::ConsoleState;
use kiosk_core::session::{outbound_channel, run_session};
use kiosk_core::trace_buffer::TraceCaptureLayer;
use kiosk_core::transcript::{DEFAULT_GREETING, NO_RESPONSE_PLACEHOLDER, ReplyMeta};
use kiosk_tui::TuiConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Terminal chat console for a helpdesk knowledge-base backend.
#[derive(Parser)]
#[command(name = "kiosk")]
struct Cli {
    /// Backend base URL. Falls back to KIOSK_ENDPOINT, then localhost:8000.
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Seed greeting shown on start and after clearing the transcript.
    #[arg(long)]
    greeting: Option<String>,

    /// Quick prompt for the picker (repeatable; replaces the built-in set).
    #[arg(long = "quick")]
    quick_prompts: Vec<String>,

    /// One-shot mode: send a single message, print the reply, and exit.
    #[arg(long)]
    message: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let endpoint = cli
        .endpoint
        .or_else(|| std::env::var("KIOSK_ENDPOINT").ok())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let client = match ChatClient::new(&endpoint, Duration::from_secs(cli.timeout_secs)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    // One-shot mode: no TUI, print to stdout.
    if let Some(message) = cli.message {
        run_one_shot(&client, &message).await;
        return;
    }

    let greeting = cli.greeting.unwrap_or_else(|| DEFAULT_GREETING.to_string());
    let state = Arc::new(Mutex::new(ConsoleState::new(client.base_url(), greeting)));

    // Set up tracing → TUI log buffer.
    let (tracing_layer, log_buffer) = TraceCaptureLayer::new();
    tracing_subscriber::registry().with(tracing_layer).init();

    let mut tui_config = TuiConfig {
        log_buffer: Some(log_buffer),
        ..Default::default()
    };
    if !cli.quick_prompts.is_empty() {
        tui_config.quick_prompts = cli.quick_prompts;
    }

    // TUI on a dedicated thread; the session loop runs here. When the
    // user quits, the TUI drops its sender, the channel closes, and the
    // loop returns.
    let (tx, rx) = outbound_channel();
    let tui_handle = kiosk_tui::spawn_tui(state.clone(), tx, tui_config);

    run_session(client, state, rx).await;

    tui_handle.join().ok();
}

async fn run_one_shot(client: &ChatClient, message: &str) {
    match client.send(message).await {
        Ok(reply) => {
            if reply.reply.is_empty() {
                println!("{NO_RESPONSE_PLACEHOLDER}");
            } else {
                println!("{}", reply.reply);
            }
            if let Some(meta) = ReplyMeta::from_reply(&reply) {
                println!("{}", meta.label());
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

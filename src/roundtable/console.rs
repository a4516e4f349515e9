//! Terminal rendering of a session.
//!
//! [`ConsoleEventHandler`] turns [`SessionEvent`]s into colored lines on stdout. Display tags
//! are color names; anything unrecognised renders uncolored.

use std::future::Future;
use std::io::{self, Write};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio_util::sync::CancellationToken;

use crate::agent::AgentRegistry;
use crate::completion::normalize_whitespace;
use crate::event::{EventHandler, SessionEvent};

const RESET: &str = "\x1b[0m";
const ADMIN_COLOR: &str = "\x1b[91m";
const SEPARATOR_WIDTH: usize = 70;

/// ANSI escape for a display tag, or `""` for unknown tags.
pub fn ansi_color(display_tag: &str) -> &'static str {
    match display_tag.to_ascii_lowercase().as_str() {
        "purple" | "magenta" => "\x1b[95m",
        "cyan" => "\x1b[96m",
        "yellow" => "\x1b[93m",
        "green" => "\x1b[92m",
        "red" => "\x1b[91m",
        "blue" => "\x1b[94m",
        _ => "",
    }
}

pub fn separator(ch: char) -> String {
    ch.to_string().repeat(SEPARATOR_WIDTH)
}

fn clock(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

/// `[HH:MM:SS] name: message` wrapped in the agent's color.
pub fn format_turn_line(
    agent_name: &str,
    message: &str,
    display_tag: &str,
    timestamp: &DateTime<Local>,
) -> String {
    format!(
        "{}[{}] {}: {}{}",
        ansi_color(display_tag),
        clock(timestamp),
        agent_name,
        normalize_whitespace(message),
        RESET
    )
}

/// Title banner listing the roster in speaking order.
pub fn print_welcome(registry: &AgentRegistry) {
    println!();
    println!("{}", separator('='));
    println!("🧩 Logic Experts Collaboration 🧩");
    println!("{}", separator('='));

    let names = registry
        .agents()
        .iter()
        .map(|a| format!("{}{}{}", ansi_color(&a.display_tag), a.name, RESET))
        .collect::<Vec<_>>()
        .join(" - ");
    println!("\n{}", names);

    println!("\nPress Ctrl+C to stop at any time");
    println!("{}", separator('='));
}

#[derive(Debug, Default)]
pub struct ConsoleEventHandler;

impl ConsoleEventHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventHandler for ConsoleEventHandler {
    async fn on_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::SessionStarted { .. } => {
                println!("\n");
                println!("{}", separator('='));
                println!("Starting endless conversation (Press Ctrl+C to stop)");
                println!("{}", separator('='));
                println!();
            }
            SessionEvent::AdminInstruction {
                text, timestamp, ..
            } => {
                println!(
                    "{}[{}] Admin: {}{}",
                    ADMIN_COLOR,
                    clock(timestamp),
                    text,
                    RESET
                );
                println!("{}", separator('='));
                println!();
            }
            SessionEvent::AgentThinking {
                agent_name,
                display_tag,
                ..
            } => {
                print!(
                    "{}[{} is thinking...]{}\r",
                    ansi_color(display_tag),
                    agent_name,
                    RESET
                );
                let _ = io::stdout().flush();
            }
            SessionEvent::TurnCompleted {
                agent_name,
                message,
                display_tag,
                timestamp,
                ..
            } => {
                // wipe the typing indicator
                print!("{}\r", " ".repeat(80));
                println!(
                    "{}",
                    format_turn_line(agent_name, message, display_tag, timestamp)
                );
            }
            SessionEvent::SessionCompleted {
                turns_completed, ..
            } => {
                println!("\n");
                println!("{}", separator('='));
                println!(
                    "Logic session completed after {} messages. Check for emergent logical notation.",
                    turns_completed
                );
                println!("{}", separator('='));
                println!();
            }
            SessionEvent::SessionCancelled {
                turns_completed, ..
            } => {
                println!("\n");
                println!("{}", separator('='));
                println!("Logic session ended after {} messages", turns_completed);
                println!("{}", separator('='));
                println!();
            }
            SessionEvent::SessionFailed {
                error_kind, error, ..
            } => {
                println!("\n[Error] {}: {}", error_kind, error);
            }
        }
    }
}

/// Cancel `cancel` on the first interrupt, then wait for another one.
///
/// Resolves to `true` when a second interrupt arrives, meaning the operator wants out even
/// though the session is still winding down. Resolves to `false` if interrupts cannot be
/// listened for.
pub async fn forward_interrupts<F, Fut>(cancel: CancellationToken, mut next_interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(e) = next_interrupt().await {
        log::warn!("Unable to listen for interrupts: {}", e);
        return false;
    }
    log::debug!("Interrupt received, cancelling session");
    cancel.cancel();

    next_interrupt().await.is_ok()
}

//! `roundtable` binary: runs one logic-puzzle session in the terminal.
//!
//! ```bash
//! export OPENROUTER_API_KEY=your_key
//! cargo run --release                  # built-in four-detective puzzle
//! cargo run --release -- session.json  # override any configuration field
//! ```
//!
//! Press Ctrl+C at any time; the current turn is dropped and the session ends cleanly.
//! A second Ctrl+C exits immediately.

use std::error::Error as StdError;
use std::sync::Arc;

use roundtable::clients::openai_compatible::OpenAICompatibleClient;
use roundtable::config::api_key_from_env;
use roundtable::console::{forward_interrupts, print_welcome, ConsoleEventHandler};
use roundtable::{Orchestration, RoundtableConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn StdError>> {
    roundtable::init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => RoundtableConfig::from_json_file(&path)?,
        None => RoundtableConfig::default(),
    };
    let registry = config.registry()?;

    let api_key = api_key_from_env()?;
    let client = OpenAICompatibleClient::new_with_base_url(
        &api_key,
        &config.api_base_url,
        config.request_timeout(),
    )?;

    print_welcome(&registry);

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if forward_interrupts(signal_token, tokio::signal::ctrl_c).await {
            println!("\nGoodbye!");
            std::process::exit(130);
        }
    });

    let mut orchestration = Orchestration::new(registry, Arc::new(client))
        .with_settings(config.session_settings())
        .with_event_handler(Arc::new(ConsoleEventHandler::new()));

    // The console handler prints the end-of-session summary in every case.
    match orchestration.run(cancel).await {
        Ok(outcome) => log::debug!(
            "session {} ended {:?} after {} turns",
            outcome.session_id,
            outcome.state,
            outcome.turns_completed
        ),
        Err(err) => log::debug!("session ended with {}", err.kind()),
    }

    Ok(())
}

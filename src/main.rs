//! chatcast - render a locale message from the command line.
//!
//! Usage: `chatcast <locale-id> [ordinal...]`

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{error, info};

use chatcast::common::{ChannelSink, OnlineUser};
use chatcast::config::{env::get_config_path, load_and_validate};
use chatcast::service::{Collaborators, MessageService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(locale_id) = args.next() else {
        bail!("usage: chatcast <locale-id> [ordinal...]");
    };
    let ordinals: Vec<String> = args.collect();

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;
    info!("Using language {}", config.language);

    let (sink, mut inbox) = ChannelSink::new("CONSOLE");
    let console = OnlineUser::console("console", Arc::new(sink));
    let service = MessageService::new(
        Arc::new(config),
        Collaborators::standalone(vec![console.clone()]),
    );

    let ordinals: Vec<&str> = ordinals.iter().map(String::as_str).collect();
    if !service.send_locale(&console, &locale_id, &ordinals) {
        info!("Locale '{}' is missing or empty", locale_id);
        return Ok(());
    }

    while let Ok(message) = inbox.try_recv() {
        println!("{}", message.plain_text());
    }

    Ok(())
}

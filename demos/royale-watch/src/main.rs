//! Terminal viewer: connects to a ChatRoyale server and prints a status
//! line whenever the game changes.
//!
//! ```text
//! royale-watch [viewer-name]
//!
//! ROYALE_CONFIG  path to a JSON ClientConfig (partial documents are fine)
//! ROYALE_HOST    overrides the host
//! ROYALE_PORT    overrides the port
//! RUST_LOG       tracing filter, default "info"
//! ```

use std::env;
use std::error::Error;

use royale::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Builds the config from a variable lookup, so tests need not touch the
/// process environment.
fn config_from(var: impl Fn(&str) -> Option<String>) -> Result<ClientConfig, Box<dyn Error>> {
    let mut config = match var("ROYALE_CONFIG") {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => ClientConfig::default(),
    };
    if let Some(host) = var("ROYALE_HOST") {
        config.host = host;
    }
    if let Some(port) = var("ROYALE_PORT") {
        config.port = port.parse()?;
    }
    Ok(config)
}

fn status_line(summary: &str, phase: Phase, countdown: Option<i64>) -> String {
    match countdown {
        Some(secs) if phase == Phase::Round => format!("{summary} | {secs}s left"),
        _ => summary.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let viewer = env::args().nth(1).unwrap_or_else(|| "viewer".to_string());
    let config = config_from(|name| env::var(name).ok())?;
    tracing::info!(endpoint = %config.endpoint_url(), %viewer, "starting royale-watch");

    let client = RoyaleClient::start(config)?;
    client.on_log(|line| println!("[royale] {line}"));
    client.subscribe(EventKind::RoundStart, |n| {
        if let Notification::Game(GameEvent::RoundStart(rules)) = n {
            let dupes = if rules.duplicates_allowed { "duplicates allowed" } else { "no duplicates" };
            println!("[round] {} ({}s, {dupes})", rules.prompt, rules.timer_seconds);
        }
    });
    client.connect().await?;

    let mut status = client.watch();
    let mut last = String::new();
    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                let line = status_line(
                    &client.summary(&viewer),
                    current.game.phase(),
                    current.countdown,
                );
                if line != last {
                    println!("{line}");
                    last = line;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    client.stop().await?;
    Ok(())
}

//! fieldsamp - watch the sample timers for one address from the terminal.
//!
//! Fetches the sample list for the configured (or argument-supplied)
//! address, then ticks once a second while any timer is running, re-rendering
//! the table. Exits when nothing is running.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;

use fieldsamp_client::api::ApiClient;
use fieldsamp_client::view::SampleList;
use fieldsamp_core::clock::{Clock, SharedClock, SystemClock};
use fieldsamp_core::config::ConfigManager;
use fieldsamp_core::logging::init_tracing;
use fieldsamp_core::timer::TimerBoard;

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fieldsamp")
        .join("settings.toml")
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = ConfigManager::new(config_path());
    config
        .load_or_create()
        .with_context(|| format!("loading configuration from {}", config.path().display()))?;
    let settings = config.settings().clone();

    init_tracing(&settings.logging.level);
    tracing::info!(version = fieldsamp_core::version(), "fieldsamp starting");

    let address_id = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<i64>())
        .transpose()
        .context("address id must be numeric")?
        .unwrap_or(settings.api.default_address_id);
    anyhow::ensure!(
        address_id > 0,
        "no address selected: pass an address id or set api.default_address_id in {}",
        config.path().display()
    );

    let token = (!settings.api.token.is_empty()).then(|| settings.api.token.clone());
    let api = ApiClient::new(&settings.api.base_url, token);
    let clock: SharedClock = Arc::new(SystemClock);
    let board = Arc::new(Mutex::new(TimerBoard::new()));
    let mut list = SampleList::new(
        api,
        address_id,
        None,
        settings.timer.cache_ttl_secs,
        board.clone(),
        clock.clone(),
    );

    let samples = list.refresh().await.context("fetching samples")?;
    println!("{}", list.render_table(&samples));

    if !board.lock().any_running() {
        return Ok(());
    }

    let mut tick =
        tokio::time::interval(Duration::from_secs(settings.timer.tick_interval_secs.max(1)));
    tick.tick().await; // first tick completes immediately
    loop {
        tick.tick().await;
        let running = board.lock().tick_all(clock.now());

        let samples = match list.refresh().await {
            Ok(samples) => samples,
            Err(err) => {
                tracing::warn!(error = %err, "refresh failed; showing last known state");
                Vec::new()
            }
        };
        if !samples.is_empty() {
            println!("{}", list.render_table(&samples));
        }

        if running == 0 {
            break;
        }
    }

    Ok(())
}

//! Bootstrap shared by the workshop demos: `.env` loading, logging and the completion marker.

use anyhow::Result;
use llm_workshop::config::WorkshopConfig;
use llm_workshop::utils::sentinel::{write_sentinel, Milestone};
use tracing_subscriber::{fmt, EnvFilter};

/// Load `.env`, read the configuration and install the log subscriber.
///
/// Logs at `debug` when `DEBUG_MODE=true`, else at `info`. `RUST_LOG` overrides both.
pub fn init() -> Result<WorkshopConfig> {
    let _ = dotenvy::dotenv();
    let config = WorkshopConfig::from_env()?;
    let level = if config.debug_mode { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_target(false).init();
    Ok(config)
}

/// [init], then print the configuration summary.
pub fn init_with_status() -> Result<WorkshopConfig> {
    let config = init()?;
    println!("🔧 {}", config.status());
    Ok(config)
}

/// Write the completion marker of `milestone` into the configured sentinel directory.
pub fn complete(config: &WorkshopConfig, milestone: Milestone) -> Result<()> {
    let path = write_sentinel(&config.sentinel_dir, milestone)?;
    tracing::info!(path = %path.display(), "{} written", milestone);
    Ok(())
}

/// The first `n` characters of `text`, with `...` when something was cut.
pub fn preview(text: &str, n: usize) -> String {
    match text.char_indices().nth(n) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

use std::sync::Arc;

use anyhow::{Context, Result};
use people_store::{http, Config, PersonStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(path = %config.store_path.display(), "opening person store");

    let store = PersonStore::open(&config.store_path)
        .with_context(|| format!("failed to open {}", config.store_path.display()))?;

    http::serve(Arc::new(store), &config.addr)
        .await
        .with_context(|| format!("failed to serve on {}", config.addr))?;
    Ok(())
}

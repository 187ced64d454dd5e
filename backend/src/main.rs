use std::sync::Arc;

use biblioteca::{
    server,
    types::{AppConfig, Environment},
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;

    // RUST_LOG wins over TRACING_LEVEL when both are set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().to_string()));

    // JSON lines for deployed stages, human-readable output locally
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env(environment)?;
    let store = config.store.connect()?;

    server::start(Arc::new(config), store).await
}

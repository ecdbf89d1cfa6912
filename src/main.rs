use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod error;
mod game;
mod retry;
mod source;

use crate::config::load_settings;
use crate::error::Result as AppResult;
use crate::retry::RetryPolicy;
use crate::source::build_source;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_PKG_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = load_settings()?;
    tracing::info!("Configuration loaded: {:?}", settings);

    let source = build_source(&settings.source)?;
    let policy = RetryPolicy::from(&settings.retry);

    cli::run(source.as_ref(), &policy).await
}

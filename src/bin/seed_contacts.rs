use identity_backend::BackendError;
use identity_backend::config::CONFIG;
use identity_backend::db::ensure_seeded;
use mimalloc::MiMalloc;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), BackendError> {
    dotenvy::dotenv().ok();

    let cfg = &CONFIG.contacts;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(CONFIG.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let options = SqliteConnectOptions::from_str(&cfg.database_url)?;
    let seeded = ensure_seeded(options, cfg.seed_count).await?;
    info!(
        database_url = %cfg.database_url,
        count = cfg.seed_count,
        seeded,
        "contacts database ready"
    );
    Ok(())
}

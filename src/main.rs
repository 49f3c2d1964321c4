use identity_backend::BackendError;
use identity_backend::config::CONFIG;
use identity_backend::db::{IdentityStorage, connect};
use identity_backend::identity::{CookieSettings, cookie_key};
use identity_backend::router::{BackendState, backend_router};
use identity_backend::seed;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), BackendError> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        environment = ?cfg.basic.environment,
        database_url = %cfg.basic.database_url,
        backend_url = %cfg.cors.backend_url,
        frontend_url = %cfg.cors.frontend_url,
        enforce_allow_list = cfg.cors.enforce_allow_list,
        loglevel = %cfg.basic.loglevel
    );

    let pool = connect(&cfg.basic.database_url).await?;
    let storage = IdentityStorage::new(pool);
    storage.init_schema().await?;

    if cfg.basic.environment.is_development() {
        seed::identity::initialize(&storage).await?;
    }

    let state = BackendState::new(
        storage,
        cookie_key(&cfg.basic)?,
        CookieSettings::from(&cfg.basic),
    );
    let app = backend_router(state, &cfg.cors);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}

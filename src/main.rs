//! Entry point: load config, wire dependencies, and run the server.

use portal::config::Config;
use portal::db::{self, PgIdentityStore, PgSessionStore};
use portal::iam::{BcryptVerifier, Iam, JwtCodec};
use portal::{create_app, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url, config.store_deadline).await?;
    let identities = Arc::new(PgIdentityStore::new(db_pool.clone(), config.store_deadline));
    let sessions = Arc::new(PgSessionStore::new(
        db_pool,
        config.iam_token_ttl,
        config.store_deadline,
    ));

    let iam = Iam::new(
        Arc::new(BcryptVerifier::new(identities.clone())),
        sessions,
        Arc::new(JwtCodec::new(&config.iam_secret_key)),
    );
    let state = AppState::new(iam, identities);

    let app = create_app(state)?;

    tracing::info!(
        addr = %config.server_addr,
        token_ttl_minutes = config.iam_token_ttl.num_minutes(),
        "listening"
    );
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

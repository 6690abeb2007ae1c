use std::sync::Arc;

use clap::Parser;
use tracing::info;

use onboard_api::auth::TokenService;
use onboard_api::clients::{BucketStore, SmtpMailer};
use onboard_api::config::Config;
use onboard_api::db::DatabaseManager;
use onboard_api::http::{app_router, AppState};
use onboard_api::observability::init_logging;

#[derive(Parser, Debug)]
#[command(name = "onboard-api")]
#[command(about = "Onboarding backend for the billing portal")]
struct Args {
    /// Port to listen on; overrides the config file.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let port = args.port.unwrap_or(config.server.port);

    let db = Arc::new(DatabaseManager::from_env().await?);
    db.run_migrations().await?;

    let tokens = TokenService::from_env()?;
    let mailer = Arc::new(SmtpMailer::from_env()?);
    let objects = Arc::new(BucketStore::from_env()?);

    let state = AppState::new(config, db, tokens, mailer, objects)?;
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

//! Lorekeep Server - Main Entry Point
//!
//! Backend for the multi-tenant knowledge base.

use anyhow::Result;
use tracing::info;

use kb_server::{api, config, db, email};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kb_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Lorekeep Server"
    );

    // Reject invalid access declarations before anything binds.
    api::validate_access_declarations()?;

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    // Initialize email service (optional - verification mail is disabled if
    // SMTP is not configured)
    let email = if config.has_smtp() {
        match email::EmailService::new(&config) {
            Ok(service) => {
                info!("SMTP email delivery configured");
                Some(service)
            }
            Err(e) => {
                tracing::warn!("Email service initialization failed: {}. Verification mail disabled.", e);
                None
            }
        }
    } else {
        info!("SMTP not configured; verification mail disabled");
        None
    };

    // Build application state
    let state = api::AppState::new(db_pool, config.clone(), email)?;

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

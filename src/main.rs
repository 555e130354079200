use dotenvy::dotenv;
use obra_api::{
    api::{self, AppState},
    config::{self, database},
    core::catalog,
    errors::{Error, Result},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;

    // 4. Read the token secret before touching the database
    let jwt_secret = config::jwt_secret()
        .inspect_err(|e| error!("JWT_SECRET not usable: {e}"))?;

    // 5. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 6. Seed the public catalog on first start
    catalog::seed_catalog(&db, &app_config.catalog)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {e}"))?;

    // 7. Serve the API
    let app = api::router(AppState::new(db, &jwt_secret), &app_config.server);
    let listener = tokio::net::TcpListener::bind(&app_config.server.bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {e}", app_config.server.bind_addr))?;
    info!("API server listening on {}", app_config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server {
            message: e.to_string(),
        })?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, finishing in-flight requests."),
        Err(e) => error!("Failed to listen for shutdown signal: {e}"),
    }
}

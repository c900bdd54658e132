//! Standalone authentication server
//!
//! Serves the register/login routes on `BIND_ADDR` (default `0.0.0.0:3000`)
//! against the database at `DATABASE_URL`.

use blogapi_auth::{AuthPlugin, Plugin};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/blogapi".into());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    let plugin = AuthPlugin::new();
    plugin.activate(pool).await?;

    let app = plugin.routes().ok_or("authentication plugin is not active")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Authentication server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

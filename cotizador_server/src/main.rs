//! Cotizador HTTP server.
//!
//! Run from repo root: `cargo run -p cotizador-server`

use cotizador::{app, ensure_database_exists, ensure_tables, AppState, Settings};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cotizador=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    ensure_tables(&pool).await?;

    let state = AppState::new(pool, &settings);
    let router = app(state, &settings);
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("cotizador listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

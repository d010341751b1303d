use anyhow::Result;
use campus_api::{build_app, ApiConfig};
use campus_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("campus_api");

    let config = ApiConfig::from_env();
    let app = build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        bind = %config.bind,
        database = config.database_url.as_deref().unwrap_or("memory"),
        "campus assistant api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

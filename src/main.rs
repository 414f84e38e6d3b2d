use jetsetgo::{app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "jetsetgo=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    if app_state.config.amadeus.has_credentials() {
        tracing::info!(base_url = %app_state.config.amadeus.base_url, "amadeus credentials configured");
    } else {
        tracing::warn!("AMADEUS_API_KEY / AMADEUS_API_SECRET missing; flight search will fail");
    }

    db::migrate(&app_state.db).await.map_err(|e| {
        tracing::error!(error = %format!("{e:#}"), "migration failed; refusing to start");
        e
    })?;

    app::serve(app::build_app(app_state)).await
}

use account_service::{app, config::AppConfig, AppState};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "account_service=debug,axum=info,tower_http=info".to_string());
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

    // Missing or bad auth settings must stop the process before it serves.
    let config = AppConfig::from_env().context("load configuration")?;
    tracing::info!(
        algorithm = ?config.jwt.algorithm,
        ttl_minutes = config.jwt.ttl_minutes,
        admin_signup = config.allow_admin_signup,
        "configuration loaded"
    );

    let state = AppState::init(config).await?;
    let config = state.config.clone();
    let app = app::build_app(state);
    app::serve(app, &config).await
}

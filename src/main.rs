mod app;
mod auth;
mod config;
mod error;
mod insights;
mod seed;
mod state;
mod store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "insider=debug,axum=info,tower_http=info".to_string());
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

    let config = config::AppConfig::from_env()?;
    let app_state = state::AppState::init(config).await?;

    seed::seed_users(
        app_state.users.as_ref(),
        &app_state.config.seed_password,
    )
    .await?;

    let app = app::build_app(app_state);
    app::serve(app).await
}

mod app;
mod assistant;
mod auth;
mod config;
mod content;
mod dashboard;
mod feedback;
mod scanner;
mod state;
mod storage;
mod weather;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "mediyo=debug,axum=info,tower_http=info".to_string());
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

    let app_state = state::AppState::init().await?;
    tracing::info!(
        data_dir = %app_state.config.data_dir.display(),
        "profile storage ready"
    );

    let router = app::build_app(app_state.clone());
    app::serve(router, app_state).await
}

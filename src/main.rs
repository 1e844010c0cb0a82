use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bowlparty::{api, auth, config::ServerConfig, janitor, rate_limit, state::AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bowlparty=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bowl Party...");

    let server_config = ServerConfig::from_env();
    let auth_config = Arc::new(auth::AuthConfig::from_env());
    let rate_limit_config = Arc::new(rate_limit::RateLimitConfig::from_env());

    let state = Arc::new(AppState::with_streak_ttl(server_config.streak_ttl));

    janitor::spawn_cache_cleanup(
        state.clone(),
        rate_limit_config.clone(),
        Duration::from_secs(60),
    );

    let app = api::router(state, auth_config, rate_limit_config)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", server_config.bind_addr);

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr).await?;
    axum::serve(listener, app).await
}

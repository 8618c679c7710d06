use chaos_server::{routes, state};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let state = state::build_state_from_env();
    if state.suggester.is_none() {
        warn!("LLM key not configured; /api/suggestions will answer 503");
    }
    info!(
        finalize_delay_ms = state.lab.config().finalize_delay.as_millis() as u64,
        reports = state.lab.reports().len(),
        "lab ready"
    );

    let bind = std::env::var("CHAOS_BIND").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let listener = match tokio::net::TcpListener::bind(&bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%bind, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(%bind, "chaos-server listening");
    if let Err(e) = axum::serve(listener, routes::api_router(state)).await {
        error!(error = %e, "server stopped");
    }
}

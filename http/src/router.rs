use crate::{
    api,
    home,
};
use axum::{
    routing::get,
    Router,
};
use redis_dashboard_config::Config;
use redis_dashboard_stats::StatsHistory;
use std::path::PathBuf;
use tower_http::{
    normalize_path::NormalizePath,
    services::ServeDir,
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub history: StatsHistory,
    /// Address the server was configured to listen on, shown on the homepage.
    pub address: String,
    pub template_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &Config, history: StatsHistory) -> Self {
        Self {
            history,
            address: config.server_address(),
            template_dir: config.server.template_dir.clone(),
            static_dir: config.server.static_dir.clone(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(home::handler))
        .route("/healthz", get(healthz))
        .nest("/api", api::router())
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The router wrapped in strict-slash normalization: `/api/stats/` is routed as `/api/stats`.
///
/// Normalization has to run before routing, which is why it wraps the router instead of being a
/// `Router::layer`.
pub fn create_app(state: AppState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(create_router(state))
}

async fn healthz() -> &'static str {
    "OK"
}

use crate::{
    error::AppError,
    router::AppState,
};
use axum::{
    extract::{
        Query,
        State,
    },
    routing::get,
    Json,
    Router,
};
use redis_dashboard_stats::StatsSnapshot;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    /// Only return the `limit` most recent snapshots.
    pub limit: Option<usize>,
}

/// Routes mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/stats/latest", get(latest))
}

/// `GET /api/stats`: collected snapshots, oldest first.
async fn stats(State(state): State<AppState>, Query(query): Query<StatsQuery>) -> Json<Vec<StatsSnapshot>> {
    let snapshots = match query.limit {
        Some(limit) => state.history.recent(limit).await,
        None => state.history.all().await,
    };
    Json(snapshots)
}

/// `GET /api/stats/latest`
async fn latest(State(state): State<AppState>) -> Result<Json<StatsSnapshot>, AppError> {
    state.history.latest().await.map(Json).ok_or(AppError::NoStats)
}

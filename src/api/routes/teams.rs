use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::TeamPerformance;
use crate::storage::queries;

#[derive(Debug, Serialize)]
pub struct TeamPerformanceResponse {
    pub teams: Vec<TeamPerformance>,
}

pub async fn team_performance(
    State(state): State<AppState>,
) -> Result<Json<TeamPerformanceResponse>, ApiError> {
    let store = state.store.lock().await;
    let teams = queries::team_performance(store.conn())?;
    Ok(Json(TeamPerformanceResponse { teams }))
}

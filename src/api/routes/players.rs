use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate;
use crate::models::{PlayerDetail, PlayerSummary};
use crate::storage::queries;

#[derive(Debug, Serialize)]
pub struct PlayerSummaryResponse {
    pub players: Vec<PlayerSummary>,
}

pub async fn player_summary(
    State(state): State<AppState>,
) -> Result<Json<PlayerSummaryResponse>, ApiError> {
    let store = state.store.lock().await;
    let players = queries::player_summaries(store.conn())?;
    Ok(Json(PlayerSummaryResponse { players }))
}

pub async fn player_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerDetail>, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Player name is empty".to_string()));
    }

    let stats = {
        let store = state.store.lock().await;
        queries::player_stats(store.conn(), &name)?
    };

    calculate::player_detail(&name, stats)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Player '{}' has no matches", name)))
}

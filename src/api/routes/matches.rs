use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::models::MatchRow;
use crate::storage::queries;

#[derive(Debug, Deserialize)]
pub struct MatchListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    #[serde(flatten)]
    pub row: MatchRow,
    pub winner: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchSummary>,
    pub pagination: PaginationMeta,
}

pub async fn list_matches(
    State(state): State<AppState>,
    Query(params): Query<MatchListParams>,
) -> Result<Json<MatchListResponse>, ApiError> {
    let rows = {
        let store = state.store.lock().await;
        queries::list_matches(store.conn())?
    };

    let pagination = Pagination::new(params.page, params.page_size);
    let meta = PaginationMeta::new(&pagination, rows.len() as u32);
    let matches = pagination
        .apply(rows)
        .into_iter()
        .map(|row| MatchSummary {
            winner: row.winner(),
            row,
        })
        .collect();

    Ok(Json(MatchListResponse {
        matches,
        pagination: meta,
    }))
}

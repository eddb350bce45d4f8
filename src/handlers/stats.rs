// src/handlers/stats.rs

use axum::{extract::State, Json};

use crate::{common::error::AppError, config::AppState, models::stats::StatsResponse};

// GET /api/leads/stats
#[utoipa::path(
    get,
    path = "/api/leads/stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Visão geral do funil", body = StatsResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn lead_stats(
    State(app_state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let response = app_state.stats_service.overview().await?;
    Ok(Json(response))
}

// src/handlers/seed.rs

use axum::{extract::State, Json};

use crate::{common::error::AppError, config::AppState, models::auth::SeedResponse};

// POST /api/seed: público e idempotente, pensado para demos e ambiente local
#[utoipa::path(
    post,
    path = "/api/seed",
    tag = "Seed",
    responses(
        (status = 200, description = "Banco populado com dados de demonstração", body = SeedResponse)
    )
)]
pub async fn run_seed(State(app_state): State<AppState>) -> Result<Json<SeedResponse>, AppError> {
    let response = app_state.seed_service.run().await?;
    Ok(Json(response))
}

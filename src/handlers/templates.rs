// src/handlers/templates.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminUser, CurrentUser},
    models::template::{
        CreateTemplatePayload, ListTemplatesQuery, SendTemplatePayload, SendTemplateResponse,
        Template,
    },
};

// GET /api/templates
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    params(ListTemplatesQuery),
    responses(
        (status = 200, description = "Templates ativos, ordenados por dia", body = Vec<Template>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<Json<Vec<Template>>, AppError> {
    let templates = app_state.template_service.list(query.day).await?;
    Ok(Json(templates))
}

// POST /api/templates (apenas admin)
#[utoipa::path(
    post,
    path = "/api/templates",
    tag = "Templates",
    request_body = CreateTemplatePayload,
    responses(
        (status = 201, description = "Template criado", body = Template),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Exige papel de admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    AdminUser(_user): AdminUser,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let template = app_state.template_service.create(payload).await?;

    Ok((StatusCode::CREATED, Json(template)))
}

// POST /api/send-template
#[utoipa::path(
    post,
    path = "/api/send-template",
    tag = "Templates",
    request_body = SendTemplatePayload,
    responses(
        (status = 200, description = "Template renderizado e despachado", body = SendTemplateResponse),
        (status = 404, description = "Lead ou template não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_template(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<SendTemplatePayload>,
) -> Result<Json<SendTemplateResponse>, AppError> {
    let response = app_state.template_service.send(&payload, &user).await?;
    Ok(Json(response))
}

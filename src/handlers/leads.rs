// src/handlers/leads.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminUser, CurrentUser},
    models::{
        activity::{Activity, ActivityListResponse, AddActionPayload, ListActivitiesQuery},
        lead::{
            BulkDeletePayload, BulkDeleteResponse, BulkUpdatePayload, BulkUpdateResponse,
            CreateLeadPayload, DeleteLeadResponse, ExportLeadsQuery, ImportLeadsResponse, Lead,
            LeadDetailResponse, LeadListResponse, ListLeadsQuery, UpdateLeadPayload,
        },
    },
    services::csv_service,
};

// =============================================================================
//  ÁREA 1: LISTAGEM, CRIAÇÃO E DETALHE
// =============================================================================

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(ListLeadsQuery),
    responses(
        (status = 200, description = "Página de leads", body = LeadListResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    Query(query): Query<ListLeadsQuery>,
) -> Result<Json<LeadListResponse>, AppError> {
    let response = app_state.lead_service.list(&query).await?;
    Ok(Json(response))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state.lead_service.create(payload, &user).await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead com histórico recente", body = LeadDetailResponse),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadDetailResponse>, AppError> {
    let detail = app_state.lead_service.get_detail(id).await?;
    Ok(Json(detail))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<Json<Lead>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = app_state.lead_service.update(id, payload, &user).await?;
    Ok(Json(lead))
}

// DELETE /api/leads/{id} (apenas admin)
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead removido", body = DeleteLeadResponse),
        (status = 403, description = "Exige papel de admin"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    AdminUser(_user): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteLeadResponse>, AppError> {
    app_state.lead_service.delete(id).await?;
    Ok(Json(DeleteLeadResponse { success: true }))
}

// =============================================================================
//  ÁREA 2: HISTÓRICO E AÇÕES
// =============================================================================

// POST /api/leads/{id}/actions
#[utoipa::path(
    post,
    path = "/api/leads/{id}/actions",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = AddActionPayload,
    responses(
        (status = 201, description = "Ação registrada", body = Activity),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_action(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let activity = app_state.lead_service.add_action(id, payload, &user).await?;

    Ok((StatusCode::CREATED, Json(activity)))
}

// GET /api/leads/{id}/activities
#[utoipa::path(
    get,
    path = "/api/leads/{id}/activities",
    tag = "Leads",
    params(
        ("id" = Uuid, Path, description = "ID do lead"),
        ListActivitiesQuery
    ),
    responses(
        (status = 200, description = "Histórico paginado", body = ActivityListResponse),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_activities(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListActivitiesQuery>,
) -> Result<Json<ActivityListResponse>, AppError> {
    let response = app_state.lead_service.list_activities(id, &query).await?;
    Ok(Json(response))
}

// =============================================================================
//  ÁREA 3: OPERAÇÕES EM MASSA
// =============================================================================

// PUT /api/leads/bulk
#[utoipa::path(
    put,
    path = "/api/leads/bulk",
    tag = "Leads",
    request_body = BulkUpdatePayload,
    responses(
        (status = 200, description = "Leads atualizados", body = BulkUpdateResponse),
        (status = 400, description = "Nenhum lead selecionado")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_update_leads(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<BulkUpdatePayload>,
) -> Result<Json<BulkUpdateResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let updated = app_state
        .lead_service
        .bulk_update(&payload.ids, &payload.updates, &user)
        .await?;

    Ok(Json(BulkUpdateResponse {
        success: true,
        updated,
    }))
}

// DELETE /api/leads/bulk (apenas admin)
#[utoipa::path(
    delete,
    path = "/api/leads/bulk",
    tag = "Leads",
    request_body = BulkDeletePayload,
    responses(
        (status = 200, description = "Leads removidos", body = BulkDeleteResponse),
        (status = 400, description = "Nenhum lead selecionado"),
        (status = 403, description = "Exige papel de admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_delete_leads(
    State(app_state): State<AppState>,
    AdminUser(_user): AdminUser,
    Json(payload): Json<BulkDeletePayload>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = app_state.lead_service.bulk_delete(&payload.ids).await?;

    Ok(Json(BulkDeleteResponse {
        success: true,
        deleted,
    }))
}

// =============================================================================
//  ÁREA 4: IMPORT / EXPORT CSV
// =============================================================================

// GET /api/leads/export
#[utoipa::path(
    get,
    path = "/api/leads/export",
    tag = "Leads",
    params(ExportLeadsQuery),
    responses(
        (status = 200, description = "Arquivo CSV", body = String, content_type = "text/csv")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_leads(
    State(app_state): State<AppState>,
    Query(query): Query<ExportLeadsQuery>,
) -> Result<Response, AppError> {
    let csv_bytes = app_state.csv_service.export(&query).await?;

    // Configura os headers para o navegador baixar o arquivo
    let disposition = format!(
        "attachment; filename=\"{}\"",
        csv_service::export_filename()
    );
    let headers = [
        (header::CONTENT_TYPE, "text/csv"),
        (header::CONTENT_DISPOSITION, disposition.as_str()),
    ];

    Ok((headers, csv_bytes).into_response())
}

// POST /api/leads/import
#[utoipa::path(
    post,
    path = "/api/leads/import",
    tag = "Leads",
    request_body(
        content = Vec<u8>,
        description = "Arquivo CSV no campo `file` do formulário",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Resultado da importação", body = ImportLeadsResponse),
        (status = 400, description = "Arquivo ausente ou CSV inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_leads(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ImportLeadsResponse>, AppError> {
    // Procura o campo `file` do formulário
    let mut data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao ler o formulário: {}", e))?
    {
        if field.name() == Some("file") {
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha ao ler o arquivo: {}", e))?,
            );
            break;
        }
    }

    let data = data.ok_or(AppError::MissingFile)?;

    let response = app_state.csv_service.import(&data, &user).await?;
    Ok(Json(response))
}

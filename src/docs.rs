// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::add_action,
        handlers::leads::list_activities,
        handlers::leads::bulk_update_leads,
        handlers::leads::bulk_delete_leads,
        handlers::leads::export_leads,
        handlers::leads::import_leads,

        // --- Stats ---
        handlers::stats::lead_stats,

        // --- Templates ---
        handlers::templates::list_templates,
        handlers::templates::create_template,
        handlers::templates::send_template,

        // --- Seed ---
        handlers::seed::run_seed,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::UserPublic,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::SeedCredentialPair,
            models::auth::SeedCredentials,
            models::auth::SeedResponse,

            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::LeadSource,
            models::lead::Lead,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,
            models::lead::Pagination,
            models::lead::LeadListResponse,
            models::lead::LeadDetailResponse,
            models::lead::BulkLeadUpdates,
            models::lead::BulkUpdatePayload,
            models::lead::BulkDeletePayload,
            models::lead::BulkUpdateResponse,
            models::lead::BulkDeleteResponse,
            models::lead::DeleteLeadResponse,
            models::lead::ImportLeadsResponse,

            // --- Activities ---
            models::activity::ActivityType,
            models::activity::Activity,
            models::activity::AddActionPayload,
            models::activity::ActivityListResponse,

            // --- Templates ---
            models::template::TemplateKind,
            models::template::Template,
            models::template::CreateTemplatePayload,
            models::template::SendTemplatePayload,
            models::template::SendTemplateResponse,

            // --- Stats ---
            models::stats::LeadCounters,
            models::stats::SourceCount,
            models::stats::FunnelDayCount,
            models::stats::FollowUpEntry,
            models::stats::StatsResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Leads", description = "Gestão de Leads e Histórico"),
        (name = "Stats", description = "Indicadores do Funil"),
        (name = "Templates", description = "Mensagens de Follow-up"),
        (name = "Seed", description = "Dados de Demonstração")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE lead_status do banco.
// Os valores trafegam exatamente como no banco ("Hot", "Warm", "Cold").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status")]
pub enum LeadStatus {
    Hot,
    Warm,
    Cold,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Hot => "Hot",
            LeadStatus::Warm => "Warm",
            LeadStatus::Cold => "Cold",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hot" => Ok(LeadStatus::Hot),
            "Warm" => Ok(LeadStatus::Warm),
            "Cold" => Ok(LeadStatus::Cold),
            other => Err(format!("invalid status '{}'", other)),
        }
    }
}

// Mapeia o CREATE TYPE lead_source do banco.
// Alguns valores não seguem convenção ("Walk-in", "GMB"), então o rename é
// feito variante a variante, tanto no serde quanto no sqlx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_source")]
pub enum LeadSource {
    #[serde(rename = "GMB")]
    #[sqlx(rename = "GMB")]
    Gmb,
    #[serde(rename = "IG")]
    #[sqlx(rename = "IG")]
    Ig,
    #[serde(rename = "Walk-in")]
    #[sqlx(rename = "Walk-in")]
    WalkIn,
    Website,
    Referral,
    Other,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Gmb => "GMB",
            LeadSource::Ig => "IG",
            LeadSource::WalkIn => "Walk-in",
            LeadSource::Website => "Website",
            LeadSource::Referral => "Referral",
            LeadSource::Other => "Other",
        }
    }
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GMB" => Ok(LeadSource::Gmb),
            "IG" => Ok(LeadSource::Ig),
            "Walk-in" => Ok(LeadSource::WalkIn),
            "Website" => Ok(LeadSource::Website),
            "Referral" => Ok(LeadSource::Referral),
            "Other" => Ok(LeadSource::Other),
            other => Err(format!("invalid source '{}'", other)),
        }
    }
}

// --- LEAD (A Entidade) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub interest: String,
    pub source: LeadSource,

    // Dia do funil de follow-up (0 a 7)
    pub funnel_day: i16,
    pub status: LeadStatus,

    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,

    // No Postgres é TEXT[], no Rust é Vec<String>
    pub tags: Vec<String>,
    pub notes: String,

    pub assigned_to: Option<Uuid>,

    // Carimbo de último contato: atualizado em TODA mutação do lead
    pub last_contacted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

// Dados para criação de um lead
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Rajesh Kumar")]
    pub name: String,

    #[validate(length(min = 1, message = "phone is required"))]
    #[schema(example = "+91 98765 43210")]
    pub phone: String,

    #[validate(length(min = 1, message = "email is required"))]
    #[schema(example = "rajesh.kumar@email.com")]
    pub email: String,

    #[validate(length(min = 1, message = "interest is required"))]
    #[schema(example = "Options Trading")]
    pub interest: String,

    pub source: LeadSource,

    #[validate(range(min = 0, max = 7, message = "funnel day must be between 0 and 7"))]
    pub funnel_day: Option<i16>,

    pub status: Option<LeadStatus>,

    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,

    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
}

// Atualização parcial: campo ausente = campo inalterado
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "phone cannot be empty"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, message = "email cannot be empty"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "interest cannot be empty"))]
    pub interest: Option<String>,

    pub source: Option<LeadSource>,

    #[validate(range(min = 0, max = 7, message = "funnel day must be between 0 and 7"))]
    pub funnel_day: Option<i16>,

    pub status: Option<LeadStatus>,

    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,

    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
}

// --- LISTAGEM / FILTROS ---

// Query string de GET /api/leads
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListLeadsQuery {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub funnel_day: Option<i16>,

    /// Lista de tags separadas por vírgula (interseção não-vazia)
    pub tags: Option<String>,

    /// Busca textual em nome, telefone ou e-mail
    pub q: Option<String>,

    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// Filtro já normalizado, pronto para o repositório
#[derive(Debug, Default, Clone)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub funnel_day: Option<i16>,
    pub tags: Option<Vec<String>>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        // Equivalente a ceil(total / limit) em aritmética inteira
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self { page, limit, total, pages }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadListResponse {
    pub leads: Vec<Lead>,
    pub pagination: Pagination,
}

// Lead + histórico recente (as 50 atividades mais novas).
// O histórico completo sai paginado em GET /api/leads/{id}/activities.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadDetailResponse {
    pub lead: Lead,
    pub activities: Vec<crate::models::activity::Activity>,
}

// --- OPERAÇÕES EM MASSA ---

// Subconjunto de campos que podem ser aplicados em massa
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkLeadUpdates {
    pub status: Option<LeadStatus>,

    #[validate(range(min = 0, max = 7, message = "funnel day must be between 0 and 7"))]
    pub funnel_day: Option<i16>,

    pub source: Option<LeadSource>,
    pub tags: Option<Vec<String>>,
}

impl BulkLeadUpdates {
    // Resumo legível gravado na atividade de cada lead afetado,
    // no formato "Bulk update: status=Cold, funnelDay=3".
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(status) = &self.status {
            parts.push(format!("status={}", status));
        }
        if let Some(day) = self.funnel_day {
            parts.push(format!("funnelDay={}", day));
        }
        if let Some(source) = &self.source {
            parts.push(format!("source={}", source));
        }
        if let Some(tags) = &self.tags {
            parts.push(format!("tags={}", tags.join(",")));
        }
        format!("Bulk update: {}", parts.join(", "))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkUpdatePayload {
    pub ids: Vec<Uuid>,

    #[validate(nested)]
    pub updates: BulkLeadUpdates,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeletePayload {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkUpdateResponse {
    pub success: bool,
    pub updated: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub deleted: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteLeadResponse {
    pub success: bool,
}

// --- EXPORT / IMPORT ---

// Query string de GET /api/leads/export.
// Quando `ids` vem preenchido, os demais filtros são ignorados.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExportLeadsQuery {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub funnel_day: Option<i16>,

    /// Lista de IDs separados por vírgula
    pub ids: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportLeadsResponse {
    pub success: bool,
    pub imported: usize,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lead_source_wire_names() {
        assert_eq!(serde_json::to_value(LeadSource::Gmb).unwrap(), json!("GMB"));
        assert_eq!(serde_json::to_value(LeadSource::Ig).unwrap(), json!("IG"));
        assert_eq!(
            serde_json::to_value(LeadSource::WalkIn).unwrap(),
            json!("Walk-in")
        );
        assert_eq!(
            serde_json::to_value(LeadSource::Website).unwrap(),
            json!("Website")
        );

        let parsed: LeadSource = serde_json::from_value(json!("Walk-in")).unwrap();
        assert_eq!(parsed, LeadSource::WalkIn);
    }

    #[test]
    fn lead_source_from_str_rejects_unknown() {
        assert_eq!("GMB".parse::<LeadSource>().unwrap(), LeadSource::Gmb);
        assert_eq!(
            "Facebook".parse::<LeadSource>().unwrap_err(),
            "invalid source 'Facebook'"
        );
        // Sensível a maiúsculas, como o vocabulário fechado original
        assert!("gmb".parse::<LeadSource>().is_err());
    }

    #[test]
    fn lead_status_from_str() {
        assert_eq!("Hot".parse::<LeadStatus>().unwrap(), LeadStatus::Hot);
        assert_eq!(
            "tepid".parse::<LeadStatus>().unwrap_err(),
            "invalid status 'tepid'"
        );
    }

    #[test]
    fn lead_serializes_camel_case() {
        let lead = Lead {
            id: Uuid::nil(),
            name: "Maria".into(),
            phone: "+55 11 99999-0000".into(),
            email: "maria@email.com".into(),
            interest: "General".into(),
            source: LeadSource::Website,
            funnel_day: 3,
            status: LeadStatus::Warm,
            next_action: Some("Call back".into()),
            next_action_date: None,
            tags: vec!["vip".into()],
            notes: String::new(),
            assigned_to: None,
            last_contacted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&lead).unwrap();
        assert_eq!(value["funnelDay"], json!(3));
        assert_eq!(value["nextAction"], json!("Call back"));
        assert_eq!(value["status"], json!("Warm"));
        assert!(value.get("funnel_day").is_none());
        assert!(value.get("lastContactedAt").is_some());
    }

    #[test]
    fn create_payload_validates_funnel_day_range() {
        let payload = CreateLeadPayload {
            name: "A".into(),
            phone: "1".into(),
            email: "a@b.c".into(),
            interest: "General".into(),
            source: LeadSource::Other,
            funnel_day: Some(9),
            status: None,
            next_action: None,
            next_action_date: None,
            tags: None,
            notes: None,
            assigned_to: None,
        };
        assert!(payload.validate().is_err());

        let payload = CreateLeadPayload { funnel_day: Some(7), ..payload };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn create_payload_requires_name() {
        let payload = CreateLeadPayload {
            name: String::new(),
            phone: "1".into(),
            email: "a@b.c".into(),
            interest: "General".into(),
            source: LeadSource::Other,
            funnel_day: None,
            status: None,
            next_action: None,
            next_action_date: None,
            tags: None,
            notes: None,
            assigned_to: None,
        };
        let err = payload.validate().unwrap_err();
        assert!(err.field_errors().contains_key("name"));
    }

    #[test]
    fn bulk_updates_describe_uses_wire_field_names() {
        let updates = BulkLeadUpdates {
            status: Some(LeadStatus::Cold),
            funnel_day: Some(3),
            source: None,
            tags: None,
        };
        assert_eq!(updates.describe(), "Bulk update: status=Cold, funnelDay=3");

        let updates = BulkLeadUpdates {
            status: None,
            funnel_day: None,
            source: Some(LeadSource::WalkIn),
            tags: Some(vec!["vip".into(), "q3".into()]),
        };
        assert_eq!(
            updates.describe(),
            "Bulk update: source=Walk-in, tags=vip,q3"
        );
    }

    #[test]
    fn pagination_rounds_up() {
        assert_eq!(Pagination::new(1, 50, 0).pages, 0);
        assert_eq!(Pagination::new(1, 50, 50).pages, 1);
        assert_eq!(Pagination::new(1, 50, 51).pages, 2);
        assert_eq!(Pagination::new(2, 10, 95).pages, 10);
    }
}

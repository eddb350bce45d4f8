// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::lead::Pagination;

// Mapeia o CREATE TYPE activity_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Note,
    StatusChange,
    FunnelUpdate,
    TemplateSent,
    Call,
    Whatsapp,
    Email,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Note => "note",
            ActivityType::StatusChange => "status_change",
            ActivityType::FunnelUpdate => "funnel_update",
            ActivityType::TemplateSent => "template_sent",
            ActivityType::Call => "call",
            ActivityType::Whatsapp => "whatsapp",
            ActivityType::Email => "email",
        }
    }
}

// Entrada do histórico de um lead. Imutável depois de criada;
// userId/userName são um snapshot do autor no momento do evento.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub lead_id: Uuid,

    // A coluna chama `kind` porque `type` é palavra reservada,
    // mas no JSON o campo continua sendo "type".
    #[serde(rename = "type")]
    pub kind: ActivityType,

    pub content: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

// Corpo de POST /api/leads/{id}/actions
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddActionPayload {
    #[serde(rename = "type")]
    pub kind: Option<ActivityType>,

    #[validate(length(min = 1, message = "content is required"))]
    #[schema(example = "Called, asked to follow up next week")]
    pub content: String,

    // Quando presentes, são gravados no próprio lead
    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,
}

// Query string de GET /api/leads/{id}/activities
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListActivitiesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityListResponse {
    pub activities: Vec<Activity>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn activity_type_wire_names() {
        assert_eq!(
            serde_json::to_value(ActivityType::StatusChange).unwrap(),
            json!("status_change")
        );
        assert_eq!(
            serde_json::to_value(ActivityType::TemplateSent).unwrap(),
            json!("template_sent")
        );
        assert_eq!(ActivityType::FunnelUpdate.as_str(), "funnel_update");
    }

    #[test]
    fn activity_kind_serializes_as_type() {
        let activity = Activity {
            id: Uuid::nil(),
            lead_id: Uuid::nil(),
            kind: ActivityType::Note,
            content: "Lead created".into(),
            user_id: Uuid::nil(),
            user_name: "Himanshu".into(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["type"], json!("note"));
        assert_eq!(value["userName"], json!("Himanshu"));
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn add_action_kind_deserializes_from_type() {
        let payload: AddActionPayload = serde_json::from_value(json!({
            "type": "call",
            "content": "Talked for 10 minutes"
        }))
        .unwrap();
        assert_eq!(payload.kind, Some(ActivityType::Call));

        // `type` ausente => None (o serviço assume `note`)
        let payload: AddActionPayload =
            serde_json::from_value(json!({ "content": "ok" })).unwrap();
        assert_eq!(payload.kind, None);
    }
}

// src/models/template.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE template_kind do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "template_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Whatsapp,
    Email,
    Sms,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Whatsapp => "whatsapp",
            TemplateKind::Email => "email",
            TemplateKind::Sms => "sms",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Mensagem pré-definida de um dia do funil.
// O conteúdo aceita os tokens {name}, {interest} e {phone}.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub name: String,

    // Dia do funil a que a mensagem pertence (0 a 7)
    pub day: i16,

    pub subject: String,
    pub content: String,

    #[serde(rename = "type")]
    pub kind: TemplateKind,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplatePayload {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Day 0 - Welcome")]
    pub name: String,

    #[validate(range(min = 0, max = 7, message = "day must be between 0 and 7"))]
    pub day: i16,

    #[validate(length(min = 1, message = "subject is required"))]
    #[schema(example = "Welcome to the academy!")]
    pub subject: String,

    #[validate(length(min = 1, message = "content is required"))]
    #[schema(example = "Hi {name}! I see you are interested in {interest}.")]
    pub content: String,

    #[serde(rename = "type")]
    pub kind: Option<TemplateKind>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTemplatesQuery {
    /// Filtra pelo dia do funil
    pub day: Option<i16>,
}

// Corpo de POST /api/send-template
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendTemplatePayload {
    pub lead_id: Uuid,
    pub template_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendTemplateResponse {
    pub success: bool,
    pub message: String,
    pub preview: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(TemplateKind::Whatsapp).unwrap(),
            json!("whatsapp")
        );
        let parsed: TemplateKind = serde_json::from_value(json!("sms")).unwrap();
        assert_eq!(parsed, TemplateKind::Sms);
    }

    #[test]
    fn create_template_day_range() {
        let mut payload = CreateTemplatePayload {
            name: "Day 8".into(),
            day: 8,
            subject: "s".into(),
            content: "c".into(),
            kind: None,
            is_active: None,
        };
        assert!(payload.validate().is_err());

        payload.day = 7;
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn template_kind_field_serializes_as_type() {
        let template = Template {
            id: Uuid::nil(),
            name: "Day 0 - Welcome".into(),
            day: 0,
            subject: "Welcome".into(),
            content: "Hi {name}!".into(),
            kind: TemplateKind::Whatsapp,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(value["type"], json!("whatsapp"));
        assert_eq!(value["isActive"], json!(true));
    }
}

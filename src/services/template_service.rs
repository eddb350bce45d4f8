// src/services/template_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, LeadRepository, TemplateRepository},
    models::{
        activity::ActivityType,
        auth::User,
        lead::Lead,
        template::{
            CreateTemplatePayload, SendTemplatePayload, SendTemplateResponse, Template,
            TemplateKind,
        },
    },
};

// Quantos caracteres do preview entram no texto da atividade
const PREVIEW_CHARS: usize = 100;

/// Substitui os tokens do template pelos dados do lead, nesta ordem:
/// {name}, {interest}, {phone}. Tokens desconhecidos ficam como estão.
pub(crate) fn render(content: &str, lead: &Lead) -> String {
    content
        .replace("{name}", &lead.name)
        .replace("{interest}", &lead.interest)
        .replace("{phone}", &lead.phone)
}

// Prefixo do conteúdo para o histórico. A reticência é incondicional.
pub(crate) fn preview_snippet(rendered: &str) -> String {
    let head: String = rendered.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Canal de saída das mensagens. A troca por um provedor real (WhatsApp
/// Business, SMTP...) acontece trocando a implementação no AppState.
#[async_trait]
pub trait OutreachDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        lead: &Lead,
        template: &Template,
        rendered: &str,
    ) -> Result<(), AppError>;
}

// Implementação padrão: só registra no log o que seria enviado
pub struct LogDispatcher;

#[async_trait]
impl OutreachDispatcher for LogDispatcher {
    async fn dispatch(
        &self,
        lead: &Lead,
        template: &Template,
        rendered: &str,
    ) -> Result<(), AppError> {
        tracing::info!("=== SENDING TEMPLATE ===");
        tracing::info!("To: {} ({})", lead.name, lead.phone);
        tracing::info!("Template: {}", template.name);
        tracing::info!("Type: {}", template.kind);
        tracing::info!("Content: {}", rendered);
        tracing::info!("========================");
        Ok(())
    }
}

#[derive(Clone)]
pub struct TemplateService {
    template_repo: TemplateRepository,
    lead_repo: LeadRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
    dispatcher: Arc<dyn OutreachDispatcher>,
}

impl TemplateService {
    pub fn new(
        template_repo: TemplateRepository,
        lead_repo: LeadRepository,
        activity_repo: ActivityRepository,
        pool: PgPool,
        dispatcher: Arc<dyn OutreachDispatcher>,
    ) -> Self {
        Self {
            template_repo,
            lead_repo,
            activity_repo,
            pool,
            dispatcher,
        }
    }

    pub async fn list(&self, day: Option<i16>) -> Result<Vec<Template>, AppError> {
        self.template_repo.list_active(&self.pool, day).await
    }

    pub async fn create(&self, payload: CreateTemplatePayload) -> Result<Template, AppError> {
        self.template_repo
            .insert(
                &self.pool,
                payload.name.trim(),
                payload.day,
                payload.subject.trim(),
                &payload.content,
                payload.kind.unwrap_or(TemplateKind::Whatsapp),
                payload.is_active.unwrap_or(true),
            )
            .await
    }

    /// Renderiza o template para o lead, despacha pelo canal configurado e
    /// registra a atividade template_sent (com carimbo de contato no lead).
    pub async fn send(
        &self,
        payload: &SendTemplatePayload,
        user: &User,
    ) -> Result<SendTemplateResponse, AppError> {
        let lead = self
            .lead_repo
            .find_by_id(&self.pool, payload.lead_id)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        let template = self
            .template_repo
            .find_by_id(&self.pool, payload.template_id)
            .await?
            .ok_or(AppError::TemplateNotFound)?;

        let rendered = render(&template.content, &lead);

        self.dispatcher.dispatch(&lead, &template, &rendered).await?;

        let content = format!(
            "Sent \"{}\" template via {}: {}",
            template.name,
            template.kind,
            preview_snippet(&rendered)
        );

        let mut tx = self.pool.begin().await?;

        self.activity_repo
            .insert(
                &mut *tx,
                lead.id,
                ActivityType::TemplateSent,
                &content,
                user.id,
                &user.name,
            )
            .await?;

        self.lead_repo.touch(&mut *tx, lead.id, None, None).await?;

        tx.commit().await?;

        Ok(SendTemplateResponse {
            success: true,
            message: format!("Template \"{}\" sent to {}", template.name, lead.name),
            preview: rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use crate::models::lead::{LeadSource, LeadStatus};

    fn sample_lead() -> Lead {
        Lead {
            id: Uuid::new_v4(),
            name: "Rajesh Kumar".into(),
            phone: "+91 98765 43210".into(),
            email: "rajesh@email.com".into(),
            interest: "Options Trading".into(),
            source: LeadSource::Gmb,
            funnel_day: 0,
            status: LeadStatus::Hot,
            next_action: None,
            next_action_date: None,
            tags: vec![],
            notes: String::new(),
            assigned_to: None,
            last_contacted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn render_replaces_all_tokens() {
        let lead = sample_lead();
        let rendered = render(
            "Hi {name}! Interested in {interest}? Confirming {phone}.",
            &lead,
        );
        assert_eq!(
            rendered,
            "Hi Rajesh Kumar! Interested in Options Trading? Confirming +91 98765 43210."
        );
    }

    #[test]
    fn render_replaces_repeated_tokens() {
        let lead = sample_lead();
        assert_eq!(
            render("{name}, {name}!", &lead),
            "Rajesh Kumar, Rajesh Kumar!"
        );
    }

    #[test]
    fn render_keeps_unknown_tokens() {
        let lead = sample_lead();
        assert_eq!(render("Hey {nickname}", &lead), "Hey {nickname}");
    }

    #[test]
    fn render_is_sequential() {
        // Um {interest} dentro do nome acaba substituído pelo passo seguinte
        let mut lead = sample_lead();
        lead.name = "{interest}".into();
        assert_eq!(render("{name}", &lead), "Options Trading");
    }

    #[test]
    fn preview_truncates_at_100_chars() {
        let long = "x".repeat(250);
        let snippet = preview_snippet(&long);
        assert_eq!(snippet.len(), 103);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn preview_keeps_short_content_but_still_adds_ellipsis() {
        assert_eq!(preview_snippet("short"), "short...");
    }
}

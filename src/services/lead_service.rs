// src/services/lead_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, LeadRepository},
    models::{
        activity::{
            Activity, ActivityListResponse, ActivityType, AddActionPayload, ListActivitiesQuery,
        },
        auth::User,
        lead::{
            BulkLeadUpdates, CreateLeadPayload, Lead, LeadDetailResponse, LeadFilter,
            LeadListResponse, LeadStatus, ListLeadsQuery, Pagination, UpdateLeadPayload,
        },
    },
};

const DEFAULT_PAGE_SIZE: i64 = 50;

// Quantas atividades acompanham o detalhe do lead
const DETAIL_ACTIVITY_LIMIT: i64 = 50;

// Normaliza page/limit vindos da query string e calcula o offset
pub(crate) fn page_params(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let offset = (page - 1) * limit;
    (page, limit, offset)
}

// "vip, q3 ,," => ["vip", "q3"]
pub(crate) fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub(crate) fn build_filter(query: &ListLeadsQuery) -> LeadFilter {
    let tags = query
        .tags
        .as_deref()
        .map(parse_tags)
        .filter(|t| !t.is_empty());

    LeadFilter {
        status: query.status,
        source: query.source,
        funnel_day: query.funnel_day,
        tags,
        q: query.q.clone(),
    }
}

/// Decide se uma atualização merece entrada no histórico e com qual texto.
/// Status vem antes do dia do funil; o tipo da atividade sai da PRIMEIRA
/// mudança da lista (mudou status => status_change, senão funnel_update).
pub(crate) fn describe_update(
    current: &Lead,
    changes: &UpdateLeadPayload,
) -> Option<(ActivityType, String)> {
    let mut notes: Vec<String> = Vec::new();

    if let Some(status) = changes.status {
        if status != current.status {
            notes.push(format!(
                "Status changed from {} to {}",
                current.status, status
            ));
        }
    }
    if let Some(day) = changes.funnel_day {
        if day != current.funnel_day {
            notes.push(format!(
                "Funnel day updated from Day {} to Day {}",
                current.funnel_day, day
            ));
        }
    }

    if notes.is_empty() {
        return None;
    }

    let kind = if notes[0].contains("Status") {
        ActivityType::StatusChange
    } else {
        ActivityType::FunnelUpdate
    };

    Some((kind, notes.join(". ")))
}

#[derive(Clone)]
pub struct LeadService {
    lead_repo: LeadRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl LeadService {
    pub fn new(lead_repo: LeadRepository, activity_repo: ActivityRepository, pool: PgPool) -> Self {
        Self {
            lead_repo,
            activity_repo,
            pool,
        }
    }

    // =========================================================================
    //  1. LISTAGEM E DETALHE
    // =========================================================================

    pub async fn list(&self, query: &ListLeadsQuery) -> Result<LeadListResponse, AppError> {
        let filter = build_filter(query);
        let (page, limit, offset) = page_params(query.page, query.limit);

        let leads = self
            .lead_repo
            .list(
                &self.pool,
                &filter,
                query.sort_by.as_deref().unwrap_or("createdAt"),
                query.sort_order.as_deref(),
                limit,
                offset,
            )
            .await?;
        let total = self.lead_repo.count(&self.pool, &filter).await?;

        Ok(LeadListResponse {
            leads,
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<LeadDetailResponse, AppError> {
        let lead = self
            .lead_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        let activities = self
            .activity_repo
            .list_for_lead(&self.pool, id, DETAIL_ACTIVITY_LIMIT, 0)
            .await?;

        Ok(LeadDetailResponse { lead, activities })
    }

    pub async fn list_activities(
        &self,
        lead_id: Uuid,
        query: &ListActivitiesQuery,
    ) -> Result<ActivityListResponse, AppError> {
        // 404 para lead inexistente, mesmo com histórico vazio
        self.lead_repo
            .find_by_id(&self.pool, lead_id)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        let (page, limit, offset) = page_params(query.page, query.limit);

        let activities = self
            .activity_repo
            .list_for_lead(&self.pool, lead_id, limit, offset)
            .await?;
        let total = self.activity_repo.count_for_lead(&self.pool, lead_id).await?;

        Ok(ActivityListResponse {
            activities,
            pagination: Pagination::new(page, limit, total),
        })
    }

    // =========================================================================
    //  2. ESCRITAS (sempre lead + atividade na MESMA transação)
    // =========================================================================

    pub async fn create(&self, payload: CreateLeadPayload, user: &User) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let lead = self
            .lead_repo
            .insert(
                &mut *tx,
                payload.name.trim(),
                payload.phone.trim(),
                &payload.email.trim().to_lowercase(),
                payload.interest.trim(),
                payload.source,
                payload.funnel_day.unwrap_or(0),
                payload.status.unwrap_or(LeadStatus::Warm),
                payload.next_action.as_deref(),
                payload.next_action_date,
                payload.tags.as_deref().unwrap_or(&[]),
                payload.notes.as_deref().unwrap_or(""),
                payload.assigned_to,
            )
            .await?;

        self.activity_repo
            .insert(
                &mut *tx,
                lead.id,
                ActivityType::Note,
                "Lead created",
                user.id,
                &user.name,
            )
            .await?;

        tx.commit().await?;

        Ok(lead)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdateLeadPayload,
        user: &User,
    ) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        // Snapshot atual para comparar e narrar as mudanças
        let current = self
            .lead_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        let note = describe_update(&current, &changes);

        let lead = self
            .lead_repo
            .update(&mut *tx, id, &changes)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        if let Some((kind, content)) = note {
            self.activity_repo
                .insert(&mut *tx, id, kind, &content, user.id, &user.name)
                .await?;
        }

        tx.commit().await?;

        Ok(lead)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // O histórico sai primeiro (a FK não tem cascade)
        self.activity_repo.delete_for_lead(&mut *tx, id).await?;
        let deleted = self.lead_repo.delete(&mut *tx, id).await?;

        if deleted == 0 {
            return Err(AppError::LeadNotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    /// Registra uma ação manual (ligação, nota...) e carimba o lead.
    /// nextAction/nextActionDate, quando presentes, são gravados no lead.
    pub async fn add_action(
        &self,
        lead_id: Uuid,
        payload: AddActionPayload,
        user: &User,
    ) -> Result<Activity, AppError> {
        let mut tx = self.pool.begin().await?;

        self.lead_repo
            .find_by_id(&mut *tx, lead_id)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        let activity = self
            .activity_repo
            .insert(
                &mut *tx,
                lead_id,
                payload.kind.unwrap_or(ActivityType::Note),
                &payload.content,
                user.id,
                &user.name,
            )
            .await?;

        self.lead_repo
            .touch(
                &mut *tx,
                lead_id,
                payload.next_action.as_deref(),
                payload.next_action_date,
            )
            .await?;

        tx.commit().await?;

        Ok(activity)
    }

    // =========================================================================
    //  3. OPERAÇÕES EM MASSA
    // =========================================================================

    pub async fn bulk_update(
        &self,
        ids: &[Uuid],
        updates: &BulkLeadUpdates,
        user: &User,
    ) -> Result<usize, AppError> {
        if ids.is_empty() {
            return Err(AppError::NoLeadsSelected);
        }

        let content = updates.describe();

        let mut tx = self.pool.begin().await?;

        self.lead_repo.bulk_update(&mut *tx, ids, updates).await?;
        self.activity_repo
            .insert_for_leads(&mut *tx, ids, ActivityType::Note, &content, user.id, &user.name)
            .await?;

        tx.commit().await?;

        // Conta os leads selecionados, não as linhas afetadas
        Ok(ids.len())
    }

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize, AppError> {
        if ids.is_empty() {
            return Err(AppError::NoLeadsSelected);
        }

        let mut tx = self.pool.begin().await?;

        self.activity_repo.delete_for_leads(&mut *tx, ids).await?;
        self.lead_repo.delete_many(&mut *tx, ids).await?;

        tx.commit().await?;

        Ok(ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::lead::LeadSource;

    fn sample_lead(status: LeadStatus, funnel_day: i16) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            name: "Rajesh Kumar".into(),
            phone: "+91 98765 43210".into(),
            email: "rajesh@email.com".into(),
            interest: "Options Trading".into(),
            source: LeadSource::Website,
            funnel_day,
            status,
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
    fn page_params_defaults_and_clamps() {
        assert_eq!(page_params(None, None), (1, 50, 0));
        assert_eq!(page_params(Some(3), Some(20)), (3, 20, 40));
        // Valores fora da faixa voltam para o mínimo
        assert_eq!(page_params(Some(0), Some(-5)), (1, 1, 0));
    }

    #[test]
    fn parse_tags_trims_and_drops_empties() {
        assert_eq!(parse_tags("vip, q3 ,,hot-lead"), vec!["vip", "q3", "hot-lead"]);
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn build_filter_ignores_blank_tag_list() {
        let query = ListLeadsQuery {
            tags: Some(" , ".into()),
            ..Default::default()
        };
        assert!(build_filter(&query).tags.is_none());
    }

    #[test]
    fn describe_update_status_change() {
        let lead = sample_lead(LeadStatus::Warm, 2);
        let changes = UpdateLeadPayload {
            status: Some(LeadStatus::Hot),
            ..Default::default()
        };

        let (kind, content) = describe_update(&lead, &changes).unwrap();
        assert_eq!(kind, ActivityType::StatusChange);
        assert_eq!(content, "Status changed from Warm to Hot");
    }

    #[test]
    fn describe_update_funnel_day_change() {
        let lead = sample_lead(LeadStatus::Warm, 2);
        let changes = UpdateLeadPayload {
            funnel_day: Some(5),
            ..Default::default()
        };

        let (kind, content) = describe_update(&lead, &changes).unwrap();
        assert_eq!(kind, ActivityType::FunnelUpdate);
        assert_eq!(content, "Funnel day updated from Day 2 to Day 5");
    }

    #[test]
    fn describe_update_both_changes_join_with_period() {
        let lead = sample_lead(LeadStatus::Warm, 0);
        let changes = UpdateLeadPayload {
            status: Some(LeadStatus::Cold),
            funnel_day: Some(7),
            ..Default::default()
        };

        // Status aparece primeiro e dita o tipo da atividade
        let (kind, content) = describe_update(&lead, &changes).unwrap();
        assert_eq!(kind, ActivityType::StatusChange);
        assert_eq!(
            content,
            "Status changed from Warm to Cold. Funnel day updated from Day 0 to Day 7"
        );
    }

    #[test]
    fn describe_update_same_values_is_silent() {
        let lead = sample_lead(LeadStatus::Hot, 4);
        let changes = UpdateLeadPayload {
            status: Some(LeadStatus::Hot),
            funnel_day: Some(4),
            notes: Some("still interested".into()),
            ..Default::default()
        };
        assert!(describe_update(&lead, &changes).is_none());
    }

    #[test]
    fn describe_update_untracked_fields_are_silent() {
        let lead = sample_lead(LeadStatus::Warm, 1);
        let changes = UpdateLeadPayload {
            name: Some("New Name".into()),
            ..Default::default()
        };
        assert!(describe_update(&lead, &changes).is_none());
    }
}

// src/db/lead_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{BulkLeadUpdates, Lead, LeadFilter, LeadSource, LeadStatus},
};

// Colunas devolvidas em toda consulta de lead, na ordem da struct
const LEAD_COLUMNS: &str = r#"
    id, name, phone, email, interest, source, funnel_day, status,
    next_action, next_action_date, tags, notes, assigned_to,
    last_contacted_at, created_at, updated_at
"#;

// Filtro compartilhado entre listagem e contagem.
// Parâmetros NULL desligam a condição correspondente ($1..$5).
const LEAD_FILTER: &str = r#"
    ($1::lead_status IS NULL OR status = $1)
    AND ($2::lead_source IS NULL OR source = $2)
    AND ($3::smallint IS NULL OR funnel_day = $3)
    AND ($4::text[] IS NULL OR tags && $4)
    AND ($5::text IS NULL OR name ILIKE $5 OR phone ILIKE $5 OR email ILIKE $5)
"#;

// Traduz o nome de ordenação vindo da query string (camelCase) para a
// coluna real. Nome desconhecido cai no padrão created_at.
pub(crate) fn sort_column(sort_by: &str) -> &'static str {
    match sort_by {
        "name" => "name",
        "status" => "status",
        "source" => "source",
        "funnelDay" => "funnel_day",
        "nextActionDate" => "next_action_date",
        "lastContactedAt" => "last_contacted_at",
        "updatedAt" => "updated_at",
        _ => "created_at",
    }
}

// Só "asc" produz ordem ascendente; qualquer outra coisa é descendente
pub(crate) fn sort_direction(sort_order: Option<&str>) -> &'static str {
    match sort_order {
        Some("asc") => "ASC",
        _ => "DESC",
    }
}

fn like_pattern(q: &Option<String>) -> Option<String> {
    q.as_ref().map(|q| format!("%{}%", q))
}

// O repositório de leads, responsável por todas as interações com a tabela 'leads'
#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM leads WHERE id = $1", LEAD_COLUMNS);
        let maybe_lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(maybe_lead)
    }

    /// Página de leads segundo filtro + ordenação.
    /// A coluna e a direção passam por whitelist antes de entrar no SQL.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &LeadFilter,
        sort_by: &str,
        sort_order: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {columns} FROM leads WHERE {filter} ORDER BY {column} {direction} LIMIT $6 OFFSET $7",
            columns = LEAD_COLUMNS,
            filter = LEAD_FILTER,
            column = sort_column(sort_by),
            direction = sort_direction(sort_order),
        );

        let leads = sqlx::query_as::<_, Lead>(&sql)
            .bind(filter.status)
            .bind(filter.source)
            .bind(filter.funnel_day)
            .bind(filter.tags.clone())
            .bind(like_pattern(&filter.q))
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?;

        Ok(leads)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &LeadFilter) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT COUNT(*) FROM leads WHERE {}", LEAD_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.status)
            .bind(filter.source)
            .bind(filter.funnel_day)
            .bind(filter.tags.clone())
            .bind(like_pattern(&filter.q))
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        name: &str,
        phone: &str,
        email: &str,
        interest: &str,
        source: LeadSource,
        funnel_day: i16,
        status: LeadStatus,
        next_action: Option<&str>,
        next_action_date: Option<chrono::DateTime<chrono::Utc>>,
        tags: &[String],
        notes: &str,
        assigned_to: Option<Uuid>,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO leads (
                name, phone, email, interest, source, funnel_day, status,
                next_action, next_action_date, tags, notes, assigned_to
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            LEAD_COLUMNS
        );

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(name)
            .bind(phone)
            .bind(email)
            .bind(interest)
            .bind(source)
            .bind(funnel_day)
            .bind(status)
            .bind(next_action)
            .bind(next_action_date)
            .bind(tags.to_vec())
            .bind(notes)
            .bind(assigned_to)
            .fetch_one(executor)
            .await?;

        Ok(lead)
    }

    /// Atualização parcial: COALESCE mantém o valor atual quando o campo
    /// vem NULL. lastContactedAt é carimbado SEMPRE, seja qual for o campo
    /// alterado (comportamento herdado e mantido de propósito).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &crate::models::lead::UpdateLeadPayload,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                interest = COALESCE($5, interest),
                source = COALESCE($6, source),
                funnel_day = COALESCE($7, funnel_day),
                status = COALESCE($8, status),
                next_action = COALESCE($9, next_action),
                next_action_date = COALESCE($10, next_action_date),
                tags = COALESCE($11, tags),
                notes = COALESCE($12, notes),
                assigned_to = COALESCE($13, assigned_to),
                last_contacted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LEAD_COLUMNS
        );

        let maybe_lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.phone.as_deref())
            .bind(changes.email.as_deref())
            .bind(changes.interest.as_deref())
            .bind(changes.source)
            .bind(changes.funnel_day)
            .bind(changes.status)
            .bind(changes.next_action.as_deref())
            .bind(changes.next_action_date)
            .bind(changes.tags.clone())
            .bind(changes.notes.as_deref())
            .bind(changes.assigned_to)
            .fetch_optional(executor)
            .await?;

        Ok(maybe_lead)
    }

    /// Grava nextAction/nextActionDate (quando presentes) e carimba o
    /// último contato. Usado pelo registro de ações e pelo envio de template.
    pub async fn touch<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        next_action: Option<&str>,
        next_action_date: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE leads SET
                next_action = COALESCE($2, next_action),
                next_action_date = COALESCE($3, next_action_date),
                last_contacted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(next_action)
        .bind(next_action_date)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn bulk_update<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
        updates: &BulkLeadUpdates,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE leads SET
                status = COALESCE($2, status),
                funnel_day = COALESCE($3, funnel_day),
                source = COALESCE($4, source),
                tags = COALESCE($5, tags),
                last_contacted_at = NOW(),
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids.to_vec())
        .bind(updates.status)
        .bind(updates.funnel_day)
        .bind(updates.source)
        .bind(updates.tags.clone())
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM leads WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Conjunto completo (sem paginação) para o export CSV, mais recente primeiro
    pub async fn list_for_export<'e, E>(
        &self,
        executor: E,
        status: Option<LeadStatus>,
        source: Option<LeadSource>,
        funnel_day: Option<i16>,
    ) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {} FROM leads
            WHERE ($1::lead_status IS NULL OR status = $1)
              AND ($2::lead_source IS NULL OR source = $2)
              AND ($3::smallint IS NULL OR funnel_day = $3)
            ORDER BY created_at DESC
            "#,
            LEAD_COLUMNS
        );

        let leads = sqlx::query_as::<_, Lead>(&sql)
            .bind(status)
            .bind(source)
            .bind(funnel_day)
            .fetch_all(executor)
            .await?;

        Ok(leads)
    }

    pub async fn list_by_ids<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM leads WHERE id = ANY($1) ORDER BY created_at DESC",
            LEAD_COLUMNS
        );
        let leads = sqlx::query_as::<_, Lead>(&sql)
            .bind(ids.to_vec())
            .fetch_all(executor)
            .await?;
        Ok(leads)
    }

    pub async fn count_all<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
            .fetch_one(executor)
            .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_whitelist() {
        assert_eq!(sort_column("funnelDay"), "funnel_day");
        assert_eq!(sort_column("nextActionDate"), "next_action_date");
        assert_eq!(sort_column("name"), "name");
        // Desconhecido (ou tentativa de injeção) cai no padrão
        assert_eq!(sort_column("createdAt"), "created_at");
        assert_eq!(sort_column("id; DROP TABLE leads"), "created_at");
        assert_eq!(sort_column(""), "created_at");
    }

    #[test]
    fn sort_direction_only_asc_is_ascending() {
        assert_eq!(sort_direction(Some("asc")), "ASC");
        assert_eq!(sort_direction(Some("desc")), "DESC");
        assert_eq!(sort_direction(Some("ASC")), "DESC");
        assert_eq!(sort_direction(None), "DESC");
    }

    #[test]
    fn like_pattern_wraps_query() {
        assert_eq!(like_pattern(&Some("ana".into())), Some("%ana%".into()));
        assert_eq!(like_pattern(&None), None);
    }
}

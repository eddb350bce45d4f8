// src/db/template_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::template::{Template, TemplateKind},
};

const TEMPLATE_COLUMNS: &str =
    "id, name, day, subject, content, kind, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Só templates ativos, ordenados por dia do funil
    pub async fn list_active<'e, E>(
        &self,
        executor: E,
        day: Option<i16>,
    ) -> Result<Vec<Template>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}
            FROM templates
            WHERE is_active = TRUE
              AND ($1::smallint IS NULL OR day = $1)
            ORDER BY day ASC
            "#,
            TEMPLATE_COLUMNS
        );

        let templates = sqlx::query_as::<_, Template>(&sql)
            .bind(day)
            .fetch_all(executor)
            .await?;

        Ok(templates)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Template>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM templates WHERE id = $1", TEMPLATE_COLUMNS);
        let maybe_template = sqlx::query_as::<_, Template>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(maybe_template)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        name: &str,
        day: i16,
        subject: &str,
        content: &str,
        kind: TemplateKind,
        is_active: bool,
    ) -> Result<Template, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO templates (name, day, subject, content, kind, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        );

        let template = sqlx::query_as::<_, Template>(&sql)
            .bind(name)
            .bind(day)
            .bind(subject)
            .bind(content)
            .bind(kind)
            .bind(is_active)
            .fetch_one(executor)
            .await?;

        Ok(template)
    }

    pub async fn count_all<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM templates")
            .fetch_one(executor)
            .await?;
        Ok(total)
    }
}

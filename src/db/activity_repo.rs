// src/db/activity_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::activity::{Activity, ActivityType},
};

const ACTIVITY_COLUMNS: &str = "id, lead_id, kind, content, user_id, user_name, created_at";

// O repositório do histórico. O histórico é append-only: não existe update.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        kind: ActivityType,
        content: &str,
        user_id: Uuid,
        user_name: &str,
    ) -> Result<Activity, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO activities (lead_id, kind, content, user_id, user_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ACTIVITY_COLUMNS
        );

        let activity = sqlx::query_as::<_, Activity>(&sql)
            .bind(lead_id)
            .bind(kind)
            .bind(content)
            .bind(user_id)
            .bind(user_name)
            .fetch_one(executor)
            .await?;

        Ok(activity)
    }

    /// Mesma entrada replicada para vários leads de uma vez (operações em massa)
    pub async fn insert_for_leads<'e, E>(
        &self,
        executor: E,
        lead_ids: &[Uuid],
        kind: ActivityType,
        content: &str,
        user_id: Uuid,
        user_name: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO activities (lead_id, kind, content, user_id, user_name)
            SELECT lead_id, $2, $3, $4, $5
            FROM UNNEST($1::uuid[]) AS t(lead_id)
            "#,
        )
        .bind(lead_ids.to_vec())
        .bind(kind)
        .bind(content)
        .bind(user_id)
        .bind(user_name)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_for_lead<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Activity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}
            FROM activities
            WHERE lead_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            ACTIVITY_COLUMNS
        );

        let activities = sqlx::query_as::<_, Activity>(&sql)
            .bind(lead_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?;

        Ok(activities)
    }

    pub async fn count_for_lead<'e, E>(&self, executor: E, lead_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activities WHERE lead_id = $1")
                .bind(lead_id)
                .fetch_one(executor)
                .await?;
        Ok(total)
    }

    /// Apaga o histórico de um lead. Chamado antes do DELETE do lead,
    /// dentro da mesma transação (a FK não tem cascade).
    pub async fn delete_for_lead<'e, E>(&self, executor: E, lead_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM activities WHERE lead_id = $1")
            .bind(lead_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_leads<'e, E>(&self, executor: E, lead_ids: &[Uuid]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM activities WHERE lead_id = ANY($1)")
            .bind(lead_ids.to_vec())
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

// src/db/stats_repo.rs

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::stats::{FollowUpEntry, FunnelDayCount, LeadCounters, SourceCount, StatsResponse},
};

// Janela [meia-noite UTC de hoje, meia-noite UTC de amanhã)
pub(crate) fn today_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let today = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let tomorrow = today + chrono::Duration::days(1);
    (today, tomorrow)
}

#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Visão completa do painel em uma transação (snapshot consistente):
    /// contadores, agrupamentos por origem/dia e os próximos follow-ups.
    pub async fn get_overview<'e, E>(&self, executor: E) -> Result<StatsResponse, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (today, tomorrow) = today_window();

        let mut tx = executor.begin().await?;

        // A. Contadores por status em uma única passada
        let (total, hot, warm, cold): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'Hot'),
                COUNT(*) FILTER (WHERE status = 'Warm'),
                COUNT(*) FILTER (WHERE status = 'Cold')
            FROM leads
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Follow-ups agendados para hoje
        let today_follow_ups = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM leads WHERE next_action_date >= $1 AND next_action_date < $2",
        )
        .bind(today)
        .bind(tomorrow)
        .fetch_one(&mut *tx)
        .await?;

        // C. Leads que entraram hoje
        let new_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM leads WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(today)
        .bind(tomorrow)
        .fetch_one(&mut *tx)
        .await?;

        // D. Distribuição por origem, mais populosa primeiro
        let by_source = sqlx::query_as::<_, SourceCount>(
            r#"
            SELECT source, COUNT(*) AS count
            FROM leads
            GROUP BY source
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        // E. Distribuição pelo dia do funil
        let by_funnel_day = sqlx::query_as::<_, FunnelDayCount>(
            r#"
            SELECT funnel_day AS day, COUNT(*) AS count
            FROM leads
            GROUP BY funnel_day
            ORDER BY funnel_day ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        // F. Próximos 10 follow-ups a partir de hoje
        let upcoming_follow_ups = sqlx::query_as::<_, FollowUpEntry>(
            r#"
            SELECT id, name, phone, status, next_action, next_action_date
            FROM leads
            WHERE next_action_date >= $1
            ORDER BY next_action_date ASC
            LIMIT 10
            "#,
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StatsResponse {
            stats: LeadCounters {
                total,
                hot,
                warm,
                cold,
                today_follow_ups,
                new_today,
            },
            by_source,
            by_funnel_day,
            upcoming_follow_ups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_window_spans_exactly_one_day() {
        let (start, end) = today_window();
        assert!(start < end);
        assert_eq!(end - start, chrono::Duration::days(1));
        assert_eq!(start.time(), NaiveTime::MIN);
        // A janela cobre o agora
        let now = Utc::now();
        assert!(start <= now && now < end);
    }
}

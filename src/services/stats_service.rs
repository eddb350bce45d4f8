// src/services/stats_service.rs

use sqlx::PgPool;

use crate::{common::error::AppError, db::StatsRepository, models::stats::StatsResponse};

#[derive(Clone)]
pub struct StatsService {
    stats_repo: StatsRepository,
    pool: PgPool,
}

impl StatsService {
    pub fn new(stats_repo: StatsRepository, pool: PgPool) -> Self {
        Self { stats_repo, pool }
    }

    pub async fn overview(&self) -> Result<StatsResponse, AppError> {
        self.stats_repo.get_overview(&self.pool).await
    }
}

// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ActivityRepository, LeadRepository, StatsRepository, TemplateRepository, UserRepository,
    },
    services::{
        template_service::LogDispatcher, AuthService, CsvService, LeadService, SeedService,
        StatsService, TemplateService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub csv_service: CsvService,
    pub template_service: TemplateService,
    pub stats_service: StatsService,
    pub seed_service: SeedService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());
        let template_repo = TemplateRepository::new(db_pool.clone());
        let stats_repo = StatsRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(user_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let lead_service =
            LeadService::new(lead_repo.clone(), activity_repo.clone(), db_pool.clone());
        let csv_service =
            CsvService::new(lead_repo.clone(), activity_repo.clone(), db_pool.clone());
        let template_service = TemplateService::new(
            template_repo.clone(),
            lead_repo.clone(),
            activity_repo.clone(),
            db_pool.clone(),
            // Canal padrão: as mensagens só vão para o log
            Arc::new(LogDispatcher),
        );
        let stats_service = StatsService::new(stats_repo, db_pool.clone());
        let seed_service = SeedService::new(
            user_repo,
            lead_repo,
            activity_repo,
            template_repo,
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            lead_service,
            csv_service,
            template_service,
            stats_service,
            seed_service,
        })
    }
}

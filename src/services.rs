pub mod auth;
pub use auth::AuthService;
pub mod lead_service;
pub use lead_service::LeadService;
pub mod csv_service;
pub use csv_service::CsvService;
pub mod template_service;
pub use template_service::TemplateService;
pub mod stats_service;
pub use stats_service::StatsService;
pub mod seed_service;
pub use seed_service::SeedService;

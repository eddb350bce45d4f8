pub mod user_repo;
pub use user_repo::UserRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod template_repo;
pub use template_repo::TemplateRepository;
pub mod stats_repo;
pub use stats_repo::StatsRepository;

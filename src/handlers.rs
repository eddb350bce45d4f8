pub mod auth;
pub mod leads;
pub mod seed;
pub mod stats;
pub mod templates;

pub mod activity;
pub mod auth;
pub mod lead;
pub mod stats;
pub mod template;

pub mod auth;
pub use auth::{auth_guard, AdminUser, CurrentUser};

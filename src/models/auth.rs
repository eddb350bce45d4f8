// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Agent,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: UserRole,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Projeção pública do usuário, usada nas respostas de autenticação
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Himanshu")]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "admin@bigbull.com")]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    // Só tem efeito depois do primeiro usuário; o primeiro vira admin
    pub role: Option<UserRole>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "admin@bigbull.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// Resposta de autenticação com o token e o usuário público
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// --- SEED ---

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedCredentialPair {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedCredentials {
    pub admin: SeedCredentialPair,
    pub agent: SeedCredentialPair,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    pub credentials: SeedCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_never_serializes_password_hash() {
        let user = User {
            id: Uuid::nil(),
            name: "Himanshu".into(),
            email: "admin@bigbull.com".into(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".into(),
            role: UserRole::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], json!("admin"));
    }

    #[test]
    fn register_payload_rejects_short_password() {
        let payload = RegisterUserPayload {
            name: "A".into(),
            email: "a@b.com".into(),
            password: "12345".into(),
            role: None,
        };
        let err = payload.validate().unwrap_err();
        assert!(err.field_errors().contains_key("password"));
    }

    #[test]
    fn user_role_wire_names() {
        assert_eq!(serde_json::to_value(UserRole::Admin).unwrap(), json!("admin"));
        let parsed: UserRole = serde_json::from_value(json!("agent")).unwrap();
        assert_eq!(parsed, UserRole::Agent);
    }
}

// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// As mensagens que vão para o cliente ficam em inglês (contrato da API).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso restrito a administradores")]
    AdminOnly,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Lead não encontrado")]
    LeadNotFound,

    #[error("Template não encontrado")]
    TemplateNotFound,

    #[error("Nenhum lead selecionado")]
    NoLeadsSelected,

    #[error("Arquivo ausente no upload")]
    MissingFile,

    #[error("Erro de CSV: {0}")]
    CsvError(#[from] csv::Error),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::BAD_REQUEST, "User with this email already exists")
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::AdminOnly => (StatusCode::FORBIDDEN, "Admin access required"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AppError::LeadNotFound => (StatusCode::NOT_FOUND, "Lead not found"),
            AppError::TemplateNotFound => (StatusCode::NOT_FOUND, "Template not found"),
            AppError::NoLeadsSelected => (StatusCode::BAD_REQUEST, "No leads selected"),
            AppError::MissingFile => (StatusCode::BAD_REQUEST, "No file provided"),
            AppError::CsvError(ref e) => {
                tracing::error!("Erro ao processar CSV: {}", e);
                (StatusCode::BAD_REQUEST, "Failed to parse CSV file")
            }

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `#[from]` cuidou da conversão; o `tracing` loga a mensagem detalhada.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

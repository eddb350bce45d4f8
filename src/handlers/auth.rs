// src/handlers/auth.rs

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentUser,
    models::auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, UserPublic},
};

// Além do corpo da resposta, o token vai num cookie httpOnly com a mesma
// validade do JWT, para clientes de navegador não precisarem guardar nada
fn token_cookie(token: String) -> Cookie<'static> {
    Cookie::build(("token", token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(7))
        .build()
}

// Handler de registro. O primeiro usuário do sistema vira admin.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 200, description = "Usuário criado e autenticado", body = AuthResponse),
        (status = 400, description = "Dados inválidos ou e-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, user) = app_state
        .auth_service
        .register_user(&payload.name, &payload.email, &payload.password, payload.role)
        .await?;

    let response = AuthResponse {
        token: token.clone(),
        user: UserPublic::from(&user),
    };

    Ok((jar.add(token_cookie(token)), Json(response)))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Autenticado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginUserPayload>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, user) = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    let response = AuthResponse {
        token: token.clone(),
        user: UserPublic::from(&user),
    };

    Ok((jar.add(token_cookie(token)), Json(response)))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = UserPublic),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserPublic> {
    Json(UserPublic::from(&user))
}

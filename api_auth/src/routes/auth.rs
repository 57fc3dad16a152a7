use actix_session::Session;
use actix_web::{Responder, post, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::http::Success;
use extractor::{SESSION_TOKEN_KEY, SESSION_USER_KEY};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::dtos::auth::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse};
use crate::services;

/// Registers a new company with its administrator and starts the trial.
///
/// # Output
/// - 201 with `{ token, user, company }`
/// - 400 on invalid input, 409 when the e-mail is taken
#[post("/register")]
async fn post_register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    req.validate()?;
    let pg_pool: &PgPool = &pool;
    let (company, user) =
        services::auth::register_company(pg_pool, req.into_inner(), &config).await?;
    let token = services::auth::issue_token(&user, &config)?;
    Success::created(RegisterResponse {
        token,
        user,
        company,
    })
}

/// Web login. The token is kept in the encrypted session cookie and also
/// returned in the body.
pub async fn post_login(
    login_data: web::Json<LoginRequest>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
    session: Session,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let user = services::auth::authenticate_user(pg_pool, &login_data).await?;
    let token = services::auth::issue_token(&user, &config)?;

    let user_string = serde_json::to_string(&user)
        .map_err(|e| AppError::Internal(format!("Failed to serialize user: {}", e)))?;
    session.renew();
    session
        .insert(SESSION_TOKEN_KEY, &token)
        .map_err(|_| AppError::Internal("Failed to insert token cookie".to_string()))?;
    session
        .insert(SESSION_USER_KEY, &user_string)
        .map_err(|_| AppError::Internal("Failed to insert user cookie".to_string()))?;

    log::info!("User {} logged in (web)", user.id);
    Success::ok(AuthResponse { token, user })
}

/// Mobile login. Same checks as the web login; the app sends the token back
/// as a bearer header.
pub async fn post_mobile_login(
    login_data: web::Json<LoginRequest>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let user = services::auth::authenticate_user(pg_pool, &login_data).await?;
    let token = services::auth::issue_token(&user, &config)?;
    log::info!("User {} logged in (mobile)", user.id);
    Success::ok(AuthResponse { token, user })
}

#[post("/logout")]
async fn post_logout(session: Session) -> Res<impl Responder> {
    session.purge();
    Success::ok(json!({ "ok": true }))
}

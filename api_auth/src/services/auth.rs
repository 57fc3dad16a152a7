use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use common::{
    enums::{Role, SubscriptionStatus},
    env_config::Config,
    error::{AppError, Res},
    jwt::{self, ClaimsSpec},
};
use db::{
    dtos::{
        company::CompanyCreateRequest, subscription::SubscriptionCreateRequest,
        user::UserCreateRequest,
    },
    models::{
        company::Company,
        user::{AuthCredentials, User},
    },
};
use sqlx::PgPool;

use crate::dtos::auth::{LoginRequest, RegisterRequest};

const INVALID_CREDENTIALS: &str = "Correo o contraseña incorrectos";

pub fn hash_password(password: &str) -> Res<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> Res<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Unique violations on `users.email` surface as 409.
pub fn conflict_on_duplicate_email(err: AppError) -> AppError {
    match &err {
        AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            AppError::Conflict("Ya existe un usuario con este correo".to_string())
        }
        _ => err,
    }
}

pub fn issue_token(user: &User, config: &Config) -> Res<String> {
    jwt::generate_jwt(
        ClaimsSpec {
            user_id: user.id,
            company_id: user.company_id,
            role: user.role,
        },
        &config.jwt_config,
    )
}

/// Creates the company, its administrator and a trial subscription on the
/// cheapest active plan, all or nothing.
pub async fn register_company(
    pool: &PgPool,
    req: RegisterRequest,
    config: &Config,
) -> Res<(Company, User)> {
    if db::user::exists_user_by_email(pool, &req.email).await? {
        return Err(AppError::Conflict(
            "Ya existe un usuario con este correo".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let mut tx = pool.begin().await?;

    let company = db::company::insert_company(
        &mut *tx,
        CompanyCreateRequest {
            name: req.company_name.trim().to_string(),
            nit: req.nit,
            phone: req.phone.clone(),
            address: req.address,
            city: req.city,
        },
    )
    .await?;

    let user = db::user::insert_user(
        &mut *tx,
        UserCreateRequest {
            company_id: Some(company.id),
            email: req.email.trim().to_string(),
            name: req.name.trim().to_string(),
            phone: req.phone,
            role: Role::Admin,
        },
    )
    .await
    .map_err(conflict_on_duplicate_email)?;

    db::user::insert_user_with_credentials(
        &mut *tx,
        AuthCredentials {
            user_id: user.id,
            password_hash,
        },
    )
    .await?;

    let plan = db::plan::get_cheapest_active_plan(&mut *tx).await?;
    let trial_ends_at = Utc::now() + Duration::days(config.trial_days);
    db::subscription::insert_subscription(
        &mut *tx,
        SubscriptionCreateRequest {
            company_id: company.id,
            plan_id: plan.id,
            status: SubscriptionStatus::Trial,
            trial_ends_at: Some(trial_ends_at),
            current_period_end: trial_ends_at,
        },
    )
    .await?;

    tx.commit().await?;
    log::info!(
        "Company {} registered on plan {} (trial until {})",
        company.id,
        plan.name,
        trial_ends_at
    );
    Ok((company, user))
}

/// Checks the credentials and that both the user and its company are active.
pub async fn authenticate_user(pool: &PgPool, login_data: &LoginRequest) -> Res<User> {
    let (user, credentials) =
        match db::user::get_user_with_password_hash(pool, login_data.email.trim()).await {
            Ok(found) => found,
            Err(AppError::Database(sqlx::Error::RowNotFound)) => {
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            Err(err) => return Err(err),
        };

    if !verify_password(&login_data.password, &credentials.password_hash)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !user.active {
        return Err(AppError::Unauthorized("El usuario está inactivo".to_string()));
    }

    if let Some(company_id) = user.company_id {
        let company = db::company::get_company_by_id(pool, company_id).await?;
        if !company.active {
            return Err(AppError::Unauthorized("La empresa está inactiva".to_string()));
        }
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("clave-segura-1").unwrap();
        assert_ne!(hash, "clave-segura-1");
        assert!(verify_password("clave-segura-1", &hash).unwrap());
        assert!(!verify_password("otra-clave", &hash).unwrap());
    }

    #[test]
    fn corrupt_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn other_errors_are_not_turned_into_conflicts() {
        let err = conflict_on_duplicate_email(AppError::BadRequest("x".to_string()));
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

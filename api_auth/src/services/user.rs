use common::{
    error::{AppError, Res},
    principal::Principal,
};
use db::{
    dtos::user::{UserCreateRequest, UserUpdateRequest},
    models::user::{AuthCredentials, User},
};
use policy::limits::LimitedResource;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::user::{CreateUserRequest, UpdateUserRequest},
    services::auth::{conflict_on_duplicate_email, hash_password},
};

/// Creates a tenant user. Vendors and delivery people count against the
/// plan; the count and the insert happen under the tenant lock.
pub async fn create_user(pool: &PgPool, company_id: Uuid, req: CreateUserRequest) -> Res<User> {
    let password_hash = hash_password(&req.password)?;
    let mut tx = pool.begin().await?;

    if let Some(resource) = LimitedResource::for_role(req.role) {
        db::limits::reserve_slot(&mut tx, company_id, resource).await?;
    }

    if db::user::exists_user_by_email(&mut *tx, &req.email).await? {
        return Err(AppError::Conflict(
            "Ya existe un usuario con este correo".to_string(),
        ));
    }

    let user = db::user::insert_user(
        &mut *tx,
        UserCreateRequest {
            company_id: Some(company_id),
            email: req.email.trim().to_string(),
            name: req.name.trim().to_string(),
            phone: req.phone,
            role: req.role,
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

    tx.commit().await?;
    Ok(user)
}

/// Updates a tenant user. A change that makes the user count against a plan
/// limit it did not count against before (new limited role, or reactivation)
/// re-checks that limit.
pub async fn update_user(
    pool: &PgPool,
    principal: &Principal,
    user_id: Uuid,
    req: UpdateUserRequest,
) -> Res<User> {
    let company_id = principal.company_id()?;
    if user_id == principal.user_id && (req.active == Some(false) || req.role.is_some()) {
        return Err(AppError::BadRequest(
            "No puedes desactivarte ni cambiar tu propio rol".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;
    let current = db::user::get_company_user(&mut *tx, company_id, user_id).await?;

    let next_role = req.role.unwrap_or(current.role);
    let next_active = req.active.unwrap_or(current.active);
    let counted_before = current.active && LimitedResource::for_role(current.role).is_some();
    let newly_counted = next_active
        && LimitedResource::for_role(next_role).is_some()
        && (!counted_before || next_role != current.role);

    if newly_counted {
        if let Some(resource) = LimitedResource::for_role(next_role) {
            db::limits::reserve_slot(&mut tx, company_id, resource).await?;
        }
    }

    if let Some(password) = &req.password {
        db::user::update_password_hash(
            &mut *tx,
            AuthCredentials {
                user_id,
                password_hash: hash_password(password)?,
            },
        )
        .await?;
    }

    let user = db::user::update_user(
        &mut *tx,
        company_id,
        user_id,
        UserUpdateRequest {
            name: req.name.map(|n| n.trim().to_string()),
            phone: req.phone,
            role: req.role,
            active: req.active,
        },
    )
    .await?;

    tx.commit().await?;
    Ok(user)
}

pub async fn deactivate_user(pool: &PgPool, principal: &Principal, user_id: Uuid) -> Res<()> {
    if user_id == principal.user_id {
        return Err(AppError::BadRequest(
            "No puedes desactivar tu propio usuario".to_string(),
        ));
    }
    db::user::deactivate_user(pool, principal.company_id()?, user_id).await
}

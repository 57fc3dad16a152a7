use common::{
    enums::Role,
    error::{AppError, Res},
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::user::{UserCreateRequest, UserFilter, UserUpdateRequest},
    models::user::{AuthCredentials, User},
};

#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

pub async fn exists_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))")
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

/// Same as [`get_user_by_id`] but restricted to one tenant.
pub async fn get_company_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    user_id: Uuid,
) -> Res<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND company_id = $2")
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))
}

pub async fn list_users<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: UserFilter,
) -> Res<Vec<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE company_id = $1
          AND ($2::user_role IS NULL OR role = $2)
          AND ($3::boolean IS NULL OR active = $3)
        ORDER BY name
        "#,
    )
    .bind(filter.company_id)
    .bind(filter.role)
    .bind(filter.active)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: UserCreateRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (company_id, email, name, phone, role)
        VALUES ($1, lower($2), $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(data.company_id)
    .bind(data.email)
    .bind(data.name)
    .bind(data.phone)
    .bind(data.role)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    user_id: Uuid,
    data: UserUpdateRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            name = COALESCE($3, name),
            phone = COALESCE($4, phone),
            role = COALESCE($5, role),
            active = COALESCE($6, active),
            updated_at = NOW()
        WHERE id = $1 AND company_id = $2
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(company_id)
    .bind(data.name)
    .bind(data.phone)
    .bind(data.role)
    .bind(data.active)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))
}

pub async fn deactivate_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    user_id: Uuid,
) -> Res<()> {
    let result = sqlx::query(
        "UPDATE users SET active = FALSE, push_token = NULL, updated_at = NOW() WHERE id = $1 AND company_id = $2",
    )
    .bind(user_id)
    .bind(company_id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Usuario no encontrado".to_string()));
    }
    Ok(())
}

pub async fn set_push_token<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    push_token: Option<String>,
) -> Res<()> {
    sqlx::query("UPDATE users SET push_token = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(push_token)
        .execute(executor)
        .await?;
    Ok(())
}

/// Active users of a role in a tenant. Used for plan limits.
pub async fn count_active_by_role<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    role: Role,
) -> Res<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE company_id = $1 AND role = $2 AND active")
        .bind(company_id)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_user_with_credentials<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: AuthCredentials,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO auth_credentials (user_id, password_hash)
        VALUES ($1, $2)
        "#,
    )
    .bind(data.user_id)
    .bind(data.password_hash)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update_password_hash<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: AuthCredentials,
) -> Res<()> {
    sqlx::query("UPDATE auth_credentials SET password_hash = $2 WHERE user_id = $1")
        .bind(data.user_id)
        .bind(data.password_hash)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn get_user_with_password_hash<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<(User, AuthCredentials)> {
    sqlx::query_as::<_, UserWithHash>(
        r#"
        SELECT u.*, ac.password_hash
        FROM users u
        JOIN auth_credentials ac ON u.id = ac.user_id
        WHERE lower(u.email) = lower($1)
        "#,
    )
    .bind(email)
    .fetch_one(executor)
    .await
    .map(|record| {
        let credentials = AuthCredentials {
            user_id: record.user.id,
            password_hash: record.password_hash,
        };
        (record.user, credentials)
    })
    .map_err(AppError::from)
}

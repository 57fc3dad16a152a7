use std::sync::Arc;

use actix_web::{Responder, delete, get, patch, post, put, web};
use common::{
    enums::Role,
    error::Res,
    http::Success,
    principal::Principal,
};
use db::dtos::user::UserFilter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::user::{CreateUserRequest, PushTokenRequest, UpdateUserRequest, UserQuery},
    services,
};

/// Profile of the authenticated user.
#[get("/me")]
async fn get_me(
    principal: web::ReqData<Principal>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let user = db::user::get_user_by_id(&***pool, principal.user_id).await?;
    Success::ok(user)
}

/// Stores the Expo push token of the calling device. `null` clears it.
#[put("/me/push-token")]
async fn put_push_token(
    principal: web::ReqData<Principal>,
    req: web::Json<PushTokenRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let token = req
        .into_inner()
        .push_token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    db::user::set_push_token(&***pool, principal.user_id, token).await?;
    Success::no_content()
}

#[get("/users")]
async fn get_users(
    principal: web::ReqData<Principal>,
    query: web::Query<UserQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    let query = query.into_inner();
    let users = db::user::list_users(
        &***pool,
        UserFilter {
            company_id: principal.company_id()?,
            role: query.role,
            active: query.active,
        },
    )
    .await?;
    Success::ok(users)
}

#[post("/users")]
async fn post_user(
    principal: web::ReqData<Principal>,
    req: web::Json<CreateUserRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    req.validate()?;
    let user = services::user::create_user(&pool, principal.company_id()?, req.into_inner()).await?;
    Success::created(user)
}

#[patch("/users/{id}")]
async fn patch_user(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateUserRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    req.validate()?;
    let user =
        services::user::update_user(&pool, &principal, path.into_inner(), req.into_inner()).await?;
    Success::ok(user)
}

/// Soft delete: the user is deactivated and keeps its history.
#[delete("/users/{id}")]
async fn delete_user(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    services::user::deactivate_user(&pool, &principal, path.into_inner()).await?;
    Success::no_content()
}

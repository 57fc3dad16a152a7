use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::company::{CompanyCreateRequest, CompanyUpdateRequest},
    models::company::Company,
};

pub async fn insert_company<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: CompanyCreateRequest,
) -> Res<Company> {
    sqlx::query_as::<_, Company>(
        r#"
        INSERT INTO companies (name, nit, phone, address, city)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(data.name)
    .bind(data.nit)
    .bind(data.phone)
    .bind(data.address)
    .bind(data.city)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_company_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
) -> Res<Company> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(company_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Empresa no encontrada".to_string()))
}

pub async fn list_companies<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<Company>> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY created_at DESC")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn update_company<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    data: CompanyUpdateRequest,
) -> Res<Company> {
    sqlx::query_as::<_, Company>(
        r#"
        UPDATE companies SET
            name = COALESCE($2, name),
            nit = COALESCE($3, nit),
            phone = COALESCE($4, phone),
            address = COALESCE($5, address),
            city = COALESCE($6, city),
            active = COALESCE($7, active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(company_id)
    .bind(data.name)
    .bind(data.nit)
    .bind(data.phone)
    .bind(data.address)
    .bind(data.city)
    .bind(data.active)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound("Empresa no encontrada".to_string()))
}

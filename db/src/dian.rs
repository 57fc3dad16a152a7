use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::dian::DianConfigUpsertRequest, models::dian::DianConfiguration};

pub async fn get_config<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
) -> Res<Option<DianConfiguration>> {
    sqlx::query_as::<_, DianConfiguration>(
        "SELECT * FROM dian_configurations WHERE company_id = $1",
    )
    .bind(company_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn upsert_config<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: DianConfigUpsertRequest,
) -> Res<DianConfiguration> {
    sqlx::query_as::<_, DianConfiguration>(
        r#"
        INSERT INTO dian_configurations (
            company_id, enabled, api_url, client_id, client_secret,
            username, password, numbering_range_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (company_id) DO UPDATE SET
            enabled = EXCLUDED.enabled,
            api_url = EXCLUDED.api_url,
            client_id = EXCLUDED.client_id,
            client_secret = EXCLUDED.client_secret,
            username = EXCLUDED.username,
            password = EXCLUDED.password,
            numbering_range_id = EXCLUDED.numbering_range_id,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(data.company_id)
    .bind(data.enabled)
    .bind(data.api_url)
    .bind(data.client_id)
    .bind(data.client_secret)
    .bind(data.username)
    .bind(data.password)
    .bind(data.numbering_range_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::customer::{CustomerCreateRequest, CustomerFilter, CustomerUpdateRequest, NearbyQuery},
    models::customer::{Customer, NearbyCustomer},
};

const EARTH_RADIUS_KM: f64 = 6371.0;

fn not_found() -> AppError {
    AppError::NotFound("Cliente no encontrado".to_string())
}

pub async fn insert_customer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: CustomerCreateRequest,
) -> Res<Customer> {
    sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers (
            company_id, vendor_id, name, business_name, nit, email, phone,
            address, city, latitude, longitude, photo_url, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(data.company_id)
    .bind(data.vendor_id)
    .bind(data.name)
    .bind(data.business_name)
    .bind(data.nit)
    .bind(data.email)
    .bind(data.phone)
    .bind(data.address)
    .bind(data.city)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(data.photo_url)
    .bind(data.notes)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_customer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    customer_id: Uuid,
) -> Res<Customer> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1 AND company_id = $2")
        .bind(customer_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(not_found)
}

/// Active customers of a tenant, optionally narrowed to one vendor and a
/// case-insensitive search over name, business name and NIT.
pub async fn list_customers<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: CustomerFilter,
) -> Res<Vec<Customer>> {
    let pattern = filter.search.map(|s| format!("%{}%", s.trim()));
    sqlx::query_as::<_, Customer>(
        r#"
        SELECT * FROM customers
        WHERE company_id = $1
          AND active
          AND ($2::uuid IS NULL OR vendor_id = $2)
          AND ($3::text IS NULL OR name ILIKE $3 OR business_name ILIKE $3 OR nit ILIKE $3)
        ORDER BY last_visit_at ASC NULLS FIRST, name
        "#,
    )
    .bind(filter.company_id)
    .bind(filter.vendor_id)
    .bind(pattern)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

/// Great-circle (haversine) search around a point, nearest first.
pub async fn list_nearby<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    query: NearbyQuery,
) -> Res<Vec<NearbyCustomer>> {
    sqlx::query_as::<_, NearbyCustomer>(
        r#"
        SELECT * FROM (
            SELECT c.*,
                $4 * 2 * asin(sqrt(
                    power(sin(radians(c.latitude - $2) / 2), 2)
                    + cos(radians($2)) * cos(radians(c.latitude))
                    * power(sin(radians(c.longitude - $3) / 2), 2)
                )) AS distance_km
            FROM customers c
            WHERE c.company_id = $1
              AND c.active
              AND c.latitude IS NOT NULL
              AND c.longitude IS NOT NULL
              AND ($5::uuid IS NULL OR c.vendor_id = $5)
        ) nearby
        WHERE distance_km <= $6
        ORDER BY distance_km
        LIMIT $7
        "#,
    )
    .bind(query.company_id)
    .bind(query.latitude)
    .bind(query.longitude)
    .bind(EARTH_RADIUS_KM)
    .bind(query.vendor_id)
    .bind(query.radius_km)
    .bind(query.limit)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_customer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    customer_id: Uuid,
    data: CustomerUpdateRequest,
) -> Res<Customer> {
    sqlx::query_as::<_, Customer>(
        r#"
        UPDATE customers SET
            vendor_id = COALESCE($3, vendor_id),
            name = COALESCE($4, name),
            business_name = COALESCE($5, business_name),
            nit = COALESCE($6, nit),
            email = COALESCE($7, email),
            phone = COALESCE($8, phone),
            address = COALESCE($9, address),
            city = COALESCE($10, city),
            latitude = COALESCE($11, latitude),
            longitude = COALESCE($12, longitude),
            photo_url = COALESCE($13, photo_url),
            notes = COALESCE($14, notes),
            active = COALESCE($15, active),
            updated_at = NOW()
        WHERE id = $1 AND company_id = $2
        RETURNING *
        "#,
    )
    .bind(customer_id)
    .bind(company_id)
    .bind(data.vendor_id)
    .bind(data.name)
    .bind(data.business_name)
    .bind(data.nit)
    .bind(data.email)
    .bind(data.phone)
    .bind(data.address)
    .bind(data.city)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(data.photo_url)
    .bind(data.notes)
    .bind(data.active)
    .fetch_optional(executor)
    .await?
    .ok_or_else(not_found)
}

pub async fn deactivate_customer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    customer_id: Uuid,
) -> Res<()> {
    let result = sqlx::query(
        "UPDATE customers SET active = FALSE, updated_at = NOW() WHERE id = $1 AND company_id = $2",
    )
    .bind(customer_id)
    .bind(company_id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

pub async fn touch_last_visit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    customer_id: Uuid,
    at: DateTime<Utc>,
) -> Res<Customer> {
    sqlx::query_as::<_, Customer>(
        "UPDATE customers SET last_visit_at = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(customer_id)
    .bind(at)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn count_active<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
) -> Res<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE company_id = $1 AND active")
        .bind(company_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

/// `last_visit_at` of every active customer, for temperature tallies.
pub async fn list_last_visits<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    vendor_id: Option<Uuid>,
) -> Res<Vec<Option<DateTime<Utc>>>> {
    sqlx::query_scalar(
        r#"
        SELECT last_visit_at FROM customers
        WHERE company_id = $1 AND active AND ($2::uuid IS NULL OR vendor_id = $2)
        "#,
    )
    .bind(company_id)
    .bind(vendor_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

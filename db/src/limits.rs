use common::{
    enums::Role,
    error::{AppError, Res},
};
use policy::{
    limits::{LimitedResource, ensure_within_limit},
    subscription::READ_ONLY_MESSAGE,
};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{customer, models::subscription::Plan, plan, user};

/// Serializes creations of `resource` inside one tenant until the surrounding
/// transaction ends.
pub async fn lock_company_resource(
    conn: &mut PgConnection,
    company_id: Uuid,
    resource: LimitedResource,
) -> Res<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || ':' || $2))")
        .bind(company_id.to_string())
        .bind(resource.lock_key())
        .execute(conn)
        .await?;
    Ok(())
}

pub fn plan_max(plan: &Plan, resource: LimitedResource) -> i32 {
    match resource {
        LimitedResource::Customers => plan.max_customers,
        LimitedResource::Vendors => plan.max_vendors,
        LimitedResource::DeliveryPeople => plan.max_delivery_people,
    }
}

pub async fn count_active(
    conn: &mut PgConnection,
    company_id: Uuid,
    resource: LimitedResource,
) -> Res<i64> {
    match resource {
        LimitedResource::Customers => customer::count_active(conn, company_id).await,
        LimitedResource::Vendors => user::count_active_by_role(conn, company_id, Role::Vendor).await,
        LimitedResource::DeliveryPeople => {
            user::count_active_by_role(conn, company_id, Role::Delivery).await
        }
    }
}

/// Takes the tenant lock for `resource`, then checks that one more active row
/// fits in the plan. Must run inside the transaction that performs the insert.
pub async fn reserve_slot(
    conn: &mut PgConnection,
    company_id: Uuid,
    resource: LimitedResource,
) -> Res<()> {
    lock_company_resource(conn, company_id, resource).await?;

    let plan = plan::get_company_plan(&mut *conn, company_id)
        .await?
        .ok_or_else(|| AppError::Forbidden(READ_ONLY_MESSAGE.to_string()))?;
    let current = count_active(conn, company_id, resource).await?;

    log::debug!(
        "Plan limit check company={} resource={} current={} max={}",
        company_id,
        resource.lock_key(),
        current,
        plan_max(&plan, resource)
    );

    ensure_within_limit(resource, plan_max(&plan, resource), current)
}

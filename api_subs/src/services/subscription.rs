use chrono::{DateTime, Utc};
use common::error::Res;
use db::models::subscription::{Plan, Subscription};
use policy::{
    limits::{LimitedResource, is_unlimited},
    subscription::{is_read_only, trial_days_left},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::subscription::{ResourceUsage, SubscriptionView, UsageSummary};

pub fn resource_usage(used: i64, max: i32) -> ResourceUsage {
    ResourceUsage {
        used,
        max,
        unlimited: is_unlimited(max),
        remaining: if is_unlimited(max) {
            None
        } else {
            Some((i64::from(max) - used).max(0))
        },
    }
}

async fn usage_for(pool: &PgPool, company_id: Uuid, plan: Option<&Plan>) -> Res<UsageSummary> {
    let mut conn = pool.acquire().await?;
    let usage = |resource: LimitedResource, used: i64| {
        let max = plan.map_or(0, |plan| db::limits::plan_max(plan, resource));
        resource_usage(used, max)
    };

    let customers =
        db::limits::count_active(&mut conn, company_id, LimitedResource::Customers).await?;
    let vendors = db::limits::count_active(&mut conn, company_id, LimitedResource::Vendors).await?;
    let delivery =
        db::limits::count_active(&mut conn, company_id, LimitedResource::DeliveryPeople).await?;

    Ok(UsageSummary {
        customers: usage(LimitedResource::Customers, customers),
        vendors: usage(LimitedResource::Vendors, vendors),
        delivery_people: usage(LimitedResource::DeliveryPeople, delivery),
    })
}

pub fn describe(
    subscription: Option<Subscription>,
    plan: Option<Plan>,
    usage: UsageSummary,
    now: DateTime<Utc>,
) -> SubscriptionView {
    let snapshot = subscription.as_ref().map(|sub| sub.snapshot());
    SubscriptionView {
        read_only: is_read_only(snapshot.as_ref(), now),
        trial_days_left: snapshot.as_ref().and_then(|s| trial_days_left(s, now)),
        subscription,
        plan,
        usage,
    }
}

/// Subscription, plan, write status and plan usage of a tenant.
pub async fn get_view(pool: &PgPool, company_id: Uuid) -> Res<SubscriptionView> {
    let subscription = db::subscription::get_by_company(pool, company_id).await?;
    let plan = match &subscription {
        Some(sub) => Some(db::plan::get_plan(pool, sub.plan_id).await?),
        None => None,
    };
    let usage = usage_for(pool, company_id, plan.as_ref()).await?;
    Ok(describe(subscription, plan, usage, Utc::now()))
}

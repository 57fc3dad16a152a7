use chrono::{DateTime, Utc};
use common::enums::SubscriptionStatus;
use db::models::subscription::{Plan, Subscription};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceUsage {
    pub used: i64,
    pub max: i32,
    pub unlimited: bool,
    pub remaining: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub customers: ResourceUsage,
    pub vendors: ResourceUsage,
    pub delivery_people: ResourceUsage,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub subscription: Option<Subscription>,
    pub plan: Option<Plan>,
    pub read_only: bool,
    pub trial_days_left: Option<i64>,
    pub usage: UsageSummary,
}

/// Superadmin override of a tenant subscription. Creates it when missing,
/// in which case `plan_id` and `current_period_end` are required.
#[derive(Debug, Deserialize)]
pub struct SubscriptionUpsertRequest {
    pub plan_id: Option<Uuid>,
    pub status: Option<SubscriptionStatus>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
}

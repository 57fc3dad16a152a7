use chrono::{DateTime, Utc};
use common::enums::SubscriptionStatus;
use uuid::Uuid;

pub struct PlanCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_monthly: i64,
    pub max_vendors: i32,
    pub max_customers: i32,
    pub max_delivery_people: i32,
    pub dian_enabled: bool,
    pub reports_enabled: bool,
    pub api_access: bool,
}

#[derive(Default)]
pub struct PlanUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_monthly: Option<i64>,
    pub max_vendors: Option<i32>,
    pub max_customers: Option<i32>,
    pub max_delivery_people: Option<i32>,
    pub dian_enabled: Option<bool>,
    pub reports_enabled: Option<bool>,
    pub api_access: Option<bool>,
    pub active: Option<bool>,
}

pub struct SubscriptionCreateRequest {
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub current_period_end: DateTime<Utc>,
}

#[derive(Default)]
pub struct SubscriptionUpdateRequest {
    pub plan_id: Option<Uuid>,
    pub status: Option<SubscriptionStatus>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
}

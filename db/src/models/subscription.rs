use chrono::{DateTime, Utc};
use common::enums::SubscriptionStatus;
use policy::subscription::SubscriptionSnapshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_monthly: i64,
    pub max_vendors: i32,
    pub max_customers: i32,
    pub max_delivery_people: i32,
    pub dian_enabled: bool,
    pub reports_enabled: bool,
    pub api_access: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub company_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub current_period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn snapshot(&self) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            status: self.status,
            trial_ends_at: self.trial_ends_at,
            current_period_end: self.current_period_end,
        }
    }
}

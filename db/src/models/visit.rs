use chrono::{DateTime, Utc};
use common::enums::VisitResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub result: Option<VisitResult>,
    pub order_amount: Option<i64>,
    pub notes: Option<String>,
}

impl Visit {
    pub fn is_open(&self) -> bool {
        self.check_out_at.is_none()
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ScheduledVisit {
    pub id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

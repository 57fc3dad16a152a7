use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ScheduledVisitQuery {
    pub vendor_id: Option<Uuid>,
    pub pending: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateScheduledVisitRequest {
    pub customer_id: Uuid,
    /// Required for admins, ignored for vendors (who schedule for themselves).
    pub vendor_id: Option<Uuid>,
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateScheduledVisitRequest {
    pub vendor_id: Option<Uuid>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

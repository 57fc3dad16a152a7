use chrono::{DateTime, Utc};
use common::enums::VisitResult;
use uuid::Uuid;

pub struct VisitCreateRequest {
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub struct VisitCheckoutRequest {
    pub result: VisitResult,
    pub order_amount: Option<i64>,
    pub notes: Option<String>,
    pub check_out_at: DateTime<Utc>,
}

pub struct VisitFilter {
    pub company_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
}

pub struct ScheduledVisitCreateRequest {
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Default)]
pub struct ScheduledVisitUpdateRequest {
    pub vendor_id: Option<Uuid>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

pub struct ScheduledVisitFilter {
    pub company_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub pending_only: bool,
}

use chrono::{DateTime, Utc};
use common::enums::{DeliveryStatus, OrderStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub visit_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub amount: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_cufe: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub order_id: Uuid,
    pub company_id: Uuid,
    pub delivery_person_id: Uuid,
    pub status: DeliveryStatus,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

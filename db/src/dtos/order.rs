use common::enums::{DeliveryStatus, OrderStatus};
use uuid::Uuid;

pub struct OrderCreateRequest {
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub visit_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub amount: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Default)]
pub struct OrderUpdateRequest {
    pub status: Option<OrderStatus>,
    pub amount: Option<i64>,
    pub notes: Option<String>,
}

pub struct OrderFilter {
    pub company_id: Uuid,
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
}

pub struct DeliveryFilter {
    pub company_id: Uuid,
    pub delivery_person_id: Option<Uuid>,
    pub status: Option<DeliveryStatus>,
}

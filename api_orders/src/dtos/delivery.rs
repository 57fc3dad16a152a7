use common::enums::DeliveryStatus;
use db::models::order::{Delivery, Order};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DeliveryQuery {
    pub status: Option<DeliveryStatus>,
    pub delivery_person_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteDeliveryRequest {
    pub status: DeliveryStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompletedDelivery {
    pub delivery: Delivery,
    pub order: Order,
}

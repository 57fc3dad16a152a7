use common::{
    enums::OrderStatus,
    error::{AppError, Res},
    validation::require_positive,
};
use db::models::order::{Delivery, Order};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub amount: i64,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Res<()> {
        if self.amount <= 0 {
            return Err(AppError::BadRequest(
                "El monto del pedido debe ser mayor a cero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub amount: Option<i64>,
    pub notes: Option<String>,
}

impl UpdateOrderRequest {
    pub fn validate(&self) -> Res<()> {
        if let Some(amount) = self.amount {
            require_positive(amount, "amount")?;
        }
        if self.status == Some(OrderStatus::InDelivery) {
            return Err(AppError::BadRequest(
                "Para enviar un pedido a reparto asígnalo a un domiciliario".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ApproveOrderRequest {
    #[serde(default)]
    pub invoice: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignOrderRequest {
    pub delivery_person_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub delivery: Option<Delivery>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_orders_need_positive_amount() {
        let mut req = CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            vendor_id: None,
            amount: 0,
            notes: None,
        };
        assert!(req.validate().is_err());
        req.amount = 45_500;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn patch_cannot_jump_to_in_delivery() {
        let req = UpdateOrderRequest {
            status: Some(OrderStatus::InDelivery),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(AppError::BadRequest(_))));

        let negative = UpdateOrderRequest {
            amount: Some(-1),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
        assert!(UpdateOrderRequest::default().validate().is_ok());
    }

    #[test]
    fn patch_amount_follows_creation_rule() {
        let zero = UpdateOrderRequest {
            amount: Some(0),
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(AppError::BadRequest(_))));

        let positive = UpdateOrderRequest {
            amount: Some(12_000),
            ..Default::default()
        };
        assert!(positive.validate().is_ok());
    }

    #[test]
    fn approve_defaults_to_no_invoice() {
        let req: ApproveOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.invoice);
    }
}

use common::{
    enums::{DeliveryStatus, OrderStatus, VisitResult},
    error::{AppError, Res},
};

/// Status of an order taken during a visit check-out.
pub const CHECKOUT_ORDER_STATUS: OrderStatus = OrderStatus::PendingReview;
/// Status of an order created by hand from the dashboard.
pub const MANUAL_ORDER_STATUS: OrderStatus = OrderStatus::Pending;

/// Legal order transitions. DELIVERED is terminal.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    match from {
        PendingReview => matches!(to, Pending | Cancelled),
        Pending => matches!(to, InDelivery | Cancelled),
        InDelivery => matches!(to, Delivered | Pending | Cancelled),
        Cancelled => matches!(to, Pending),
        Delivered => false,
    }
}

pub fn ensure_transition(from: OrderStatus, to: OrderStatus) -> Res<()> {
    if from == OrderStatus::Delivered {
        return Err(AppError::BadRequest(
            "El pedido ya fue entregado y no se puede modificar".to_string(),
        ));
    }
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "No se puede cambiar un pedido de {} a {}",
            from, to
        )))
    }
}

/// Any edit of an order, status change or not, is refused once delivered.
pub fn ensure_editable(status: OrderStatus) -> Res<()> {
    if status == OrderStatus::Delivered {
        Err(AppError::BadRequest(
            "El pedido ya fue entregado y no se puede modificar".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Amount of the order produced by a check-out, if any.
pub fn checkout_order_amount(result: VisitResult, order_amount: Option<i64>) -> Res<Option<i64>> {
    match result {
        VisitResult::OrderTaken => match order_amount {
            Some(amount) if amount > 0 => Ok(Some(amount)),
            _ => Err(AppError::BadRequest(
                "Un pedido tomado requiere un monto mayor a cero".to_string(),
            )),
        },
        VisitResult::NotHome | VisitResult::Refused => Ok(None),
    }
}

/// Order status once its delivery reached a terminal state.
pub fn order_status_after_delivery(status: DeliveryStatus) -> Res<OrderStatus> {
    match status {
        DeliveryStatus::Delivered => Ok(OrderStatus::Delivered),
        DeliveryStatus::Failed => Ok(OrderStatus::Pending),
        DeliveryStatus::Pending => Err(AppError::BadRequest(
            "La entrega debe finalizar como DELIVERED o FAILED".to_string(),
        )),
    }
}

/// Order assignment accepts PENDING orders and reactivates CANCELLED ones.
/// Returns the intermediate statuses the order goes through.
pub fn assignment_path(current: OrderStatus) -> Res<Vec<OrderStatus>> {
    match current {
        OrderStatus::Pending => Ok(vec![OrderStatus::InDelivery]),
        OrderStatus::Cancelled => Ok(vec![OrderStatus::Pending, OrderStatus::InDelivery]),
        other => {
            ensure_editable(other)?;
            Err(AppError::BadRequest(format!(
                "Solo se pueden asignar pedidos PENDING o CANCELLED (actual: {})",
                other
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 5] = [PendingReview, Pending, InDelivery, Delivered, Cancelled];

    #[test]
    fn happy_path_is_allowed() {
        assert!(can_transition(PendingReview, Pending));
        assert!(can_transition(Pending, InDelivery));
        assert!(can_transition(InDelivery, Delivered));
    }

    #[test]
    fn unassign_and_reactivation_are_allowed() {
        assert!(can_transition(InDelivery, Pending));
        assert!(can_transition(Cancelled, Pending));
    }

    #[test]
    fn delivered_rejects_everything() {
        for to in ALL {
            assert!(!can_transition(Delivered, to));
            assert!(ensure_transition(Delivered, to).is_err());
        }
        assert!(ensure_editable(Delivered).is_err());
    }

    #[test]
    fn skipping_steps_is_rejected() {
        assert!(!can_transition(PendingReview, InDelivery));
        assert!(!can_transition(PendingReview, Delivered));
        assert!(!can_transition(Pending, Delivered));
        assert!(!can_transition(Cancelled, Delivered));
        assert!(matches!(
            ensure_transition(Pending, Delivered),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn checkout_requires_positive_amount_for_orders() {
        assert_eq!(
            checkout_order_amount(VisitResult::OrderTaken, Some(97_000)).unwrap(),
            Some(97_000)
        );
        assert!(checkout_order_amount(VisitResult::OrderTaken, None).is_err());
        assert!(checkout_order_amount(VisitResult::OrderTaken, Some(0)).is_err());
        assert_eq!(
            checkout_order_amount(VisitResult::NotHome, Some(5_000)).unwrap(),
            None
        );
        assert_eq!(checkout_order_amount(VisitResult::Refused, None).unwrap(), None);
    }

    #[test]
    fn delivery_outcome_drives_order_status() {
        assert_eq!(
            order_status_after_delivery(DeliveryStatus::Delivered).unwrap(),
            Delivered
        );
        assert_eq!(order_status_after_delivery(DeliveryStatus::Failed).unwrap(), Pending);
        assert!(order_status_after_delivery(DeliveryStatus::Pending).is_err());
    }

    #[test]
    fn assignment_reactivates_cancelled_orders() {
        assert_eq!(assignment_path(Pending).unwrap(), vec![InDelivery]);
        assert_eq!(assignment_path(Cancelled).unwrap(), vec![Pending, InDelivery]);
        assert!(assignment_path(PendingReview).is_err());
        assert!(assignment_path(Delivered).is_err());
        assert!(assignment_path(InDelivery).is_err());
    }

    #[test]
    fn every_assignment_path_is_made_of_legal_steps() {
        for start in [Pending, Cancelled] {
            let mut current = start;
            for next in assignment_path(start).unwrap() {
                assert!(can_transition(current, next));
                current = next;
            }
        }
    }
}

use chrono::Utc;
use common::{
    enums::Role,
    error::{AppError, Res},
    principal::Principal,
};
use db::models::order::Delivery;
use policy::lifecycle::{ensure_transition, order_status_after_delivery};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::delivery::{CompleteDeliveryRequest, CompletedDelivery};

/// Delivery people only see and close their own deliveries.
pub fn visible_person(principal: &Principal, requested: Option<Uuid>) -> Option<Uuid> {
    if principal.role == Role::Delivery {
        Some(principal.user_id)
    } else {
        requested
    }
}

fn ensure_assignee(principal: &Principal, delivery: &Delivery) -> Res<()> {
    if principal.is_admin() || delivery.delivery_person_id == principal.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Esta entrega está asignada a otro domiciliario".to_string(),
        ))
    }
}

/// Closes a delivery and moves its order: DELIVERED on success, back to
/// PENDING on failure so it can be reassigned.
pub async fn complete(
    pool: &PgPool,
    principal: &Principal,
    delivery_id: Uuid,
    req: CompleteDeliveryRequest,
) -> Res<CompletedDelivery> {
    let company_id = principal.company_id()?;
    let next_order_status = order_status_after_delivery(req.status)?;

    let mut tx = pool.begin().await?;
    let current = db::delivery::get_delivery_for_update(&mut *tx, company_id, delivery_id).await?;
    ensure_assignee(principal, &current)?;

    let order = db::order::get_order_for_update(&mut *tx, company_id, current.order_id).await?;
    ensure_transition(order.status, next_order_status)?;

    let delivery =
        db::delivery::complete_delivery(&mut *tx, delivery_id, req.status, req.notes, Utc::now())
            .await?;
    let order = db::order::set_status(&mut *tx, order.id, next_order_status).await?;
    tx.commit().await?;

    log::info!(
        "Delivery {} finished as {:?}, order {} is now {}",
        delivery.id,
        delivery.status,
        order.id,
        order.status
    );
    Ok(CompletedDelivery { delivery, order })
}

#[cfg(test)]
mod tests {
    use common::enums::DeliveryStatus;

    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            role,
        }
    }

    fn delivery_for(person: Uuid) -> Delivery {
        let now = Utc::now();
        Delivery {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            delivery_person_id: person,
            status: DeliveryStatus::Pending,
            notes: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn couriers_are_pinned_to_themselves() {
        let courier = principal(Role::Delivery);
        assert_eq!(visible_person(&courier, Some(Uuid::new_v4())), Some(courier.user_id));
        let other = Uuid::new_v4();
        assert_eq!(visible_person(&principal(Role::Admin), Some(other)), Some(other));
    }

    #[test]
    fn only_assignee_or_admin_completes() {
        let courier = principal(Role::Delivery);
        assert!(ensure_assignee(&courier, &delivery_for(courier.user_id)).is_ok());
        assert!(ensure_assignee(&courier, &delivery_for(Uuid::new_v4())).is_err());
        assert!(ensure_assignee(&principal(Role::Admin), &delivery_for(Uuid::new_v4())).is_ok());
    }
}

use api_dian::client::IssuedInvoice;
use common::{
    enums::{DeliveryStatus, OrderStatus, Role},
    error::{AppError, Res},
    principal::Principal,
    push::{self, PushMessage},
};
use db::{
    dtos::order::{OrderCreateRequest, OrderFilter},
    models::{
        order::{Delivery, Order},
        user::User,
    },
};
use policy::lifecycle::{
    MANUAL_ORDER_STATUS, assignment_path, ensure_editable, ensure_transition,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::order::{CreateOrderRequest, OrderDetail, OrderQuery, UpdateOrderRequest};

/// Vendors only see the orders they took.
pub fn visible_vendor(principal: &Principal, requested: Option<Uuid>) -> Option<Uuid> {
    if principal.role == Role::Vendor {
        Some(principal.user_id)
    } else {
        requested
    }
}

/// Whether `principal` may read an order with this delivery.
pub fn can_read(principal: &Principal, order: &Order, delivery: Option<&Delivery>) -> bool {
    match principal.role {
        Role::Admin | Role::Superadmin => true,
        Role::Vendor => order.vendor_id == Some(principal.user_id),
        Role::Delivery => delivery.is_some_and(|d| d.delivery_person_id == principal.user_id),
    }
}

pub async fn list(pool: &PgPool, principal: &Principal, query: OrderQuery) -> Res<Vec<Order>> {
    db::order::list_orders(
        pool,
        OrderFilter {
            company_id: principal.company_id()?,
            status: query.status,
            customer_id: query.customer_id,
            vendor_id: visible_vendor(principal, query.vendor_id),
        },
    )
    .await
}

pub async fn detail(pool: &PgPool, principal: &Principal, order_id: Uuid) -> Res<OrderDetail> {
    let order = db::order::get_order(pool, principal.company_id()?, order_id).await?;
    let delivery = db::delivery::get_for_order(pool, order.id).await?;
    if !can_read(principal, &order, delivery.as_ref()) {
        return Err(AppError::NotFound("Pedido no encontrado".to_string()));
    }
    Ok(OrderDetail { order, delivery })
}

pub async fn create(pool: &PgPool, company_id: Uuid, req: CreateOrderRequest) -> Res<Order> {
    let customer = db::customer::get_customer(pool, company_id, req.customer_id).await?;
    if !customer.active {
        return Err(AppError::BadRequest("El cliente está inactivo".to_string()));
    }
    if let Some(vendor_id) = req.vendor_id {
        let vendor = db::user::get_company_user(pool, company_id, vendor_id).await?;
        if vendor.role != Role::Vendor {
            return Err(AppError::BadRequest(
                "El usuario indicado no es un vendedor".to_string(),
            ));
        }
    }

    db::order::insert_order(
        pool,
        OrderCreateRequest {
            company_id,
            customer_id: customer.id,
            visit_id: None,
            vendor_id: req.vendor_id,
            amount: req.amount,
            status: MANUAL_ORDER_STATUS,
            notes: req.notes,
        },
    )
    .await
}

/// Edits amount, notes and status. Leaving IN_DELIVERY drops the pending
/// delivery; reaching DELIVERED closes it.
pub async fn update(
    pool: &PgPool,
    company_id: Uuid,
    order_id: Uuid,
    req: UpdateOrderRequest,
) -> Res<Order> {
    let mut tx = pool.begin().await?;
    let current = db::order::get_order_for_update(&mut *tx, company_id, order_id).await?;
    ensure_editable(current.status)?;

    let next = req.status.filter(|status| *status != current.status);
    if let Some(next) = next {
        ensure_transition(current.status, next)?;
    }

    let mut order = db::order::update_details(&mut *tx, order_id, req.amount, req.notes).await?;

    if let Some(next) = next {
        match next {
            OrderStatus::Delivered => {
                if let Some(delivery) = db::delivery::get_for_order(&mut *tx, order_id).await? {
                    db::delivery::complete_delivery(
                        &mut *tx,
                        delivery.id,
                        DeliveryStatus::Delivered,
                        None,
                        chrono::Utc::now(),
                    )
                    .await?;
                }
            }
            _ if current.status == OrderStatus::InDelivery => {
                db::delivery::delete_pending_for_order(&mut *tx, order_id).await?;
            }
            _ => {}
        }
        order = db::order::set_status(&mut *tx, order_id, next).await?;
        log::info!("Order {} moved {} -> {}", order_id, current.status, next);
    }

    tx.commit().await?;
    Ok(order)
}

/// PENDING_REVIEW -> PENDING, optionally issuing the electronic invoice.
/// A provider failure aborts the transaction and the order stays in review.
pub async fn approve(
    pool: &PgPool,
    http: &reqwest::Client,
    company_id: Uuid,
    order_id: Uuid,
    invoice: bool,
) -> Res<Order> {
    let mut tx = pool.begin().await?;
    let current = db::order::get_order_for_update(&mut *tx, company_id, order_id).await?;
    if current.status != OrderStatus::PendingReview {
        ensure_editable(current.status)?;
        return Err(AppError::BadRequest(format!(
            "Solo se aprueban pedidos en PENDING_REVIEW (actual: {})",
            current.status
        )));
    }
    ensure_transition(current.status, OrderStatus::Pending)?;

    let mut issued = None;
    if invoice {
        if current.invoice_number.is_some() {
            return Err(AppError::Conflict("El pedido ya tiene factura".to_string()));
        }
        let customer = db::customer::get_customer(&mut *tx, company_id, current.customer_id).await?;
        issued = Some(api_dian::services::invoice::issue(pool, http, &current, &customer).await?);
    }

    let saved = async {
        if let Some(issued) = &issued {
            db::order::set_invoice(&mut *tx, order_id, &issued.number, issued.cufe.as_deref())
                .await?;
        }
        let order = db::order::set_status(&mut *tx, order_id, OrderStatus::Pending).await?;
        tx.commit().await?;
        Ok::<Order, AppError>(order)
    }
    .await;

    match (saved, issued) {
        (Ok(order), _) => {
            log::info!("Order {} approved (invoice={})", order_id, invoice);
            Ok(order)
        }
        (Err(err), Some(issued)) => {
            log_orphan_invoice(order_id, &issued, &err);
            Err(err)
        }
        (Err(err), None) => Err(err),
    }
}

/// The provider already issued the invoice but no order records it.
fn log_orphan_invoice(order_id: Uuid, issued: &IssuedInvoice, err: &AppError) {
    log::error!("{}", orphan_invoice_message(order_id, issued, err));
}

fn orphan_invoice_message(order_id: Uuid, issued: &IssuedInvoice, err: &AppError) -> String {
    format!(
        "Invoice {} (CUFE {}) was issued for order {} but could not be saved: {}",
        issued.number,
        issued.cufe.as_deref().unwrap_or("-"),
        order_id,
        err
    )
}

async fn active_delivery_person(pool: &PgPool, company_id: Uuid, user_id: Uuid) -> Res<User> {
    let user = db::user::get_company_user(pool, company_id, user_id).await?;
    if user.role != Role::Delivery || !user.active {
        return Err(AppError::BadRequest(
            "El usuario indicado no es un domiciliario activo".to_string(),
        ));
    }
    Ok(user)
}

/// Sends the order to a delivery person. CANCELLED orders are reactivated
/// on the way.
pub async fn assign(
    pool: &PgPool,
    http: &reqwest::Client,
    push_api_url: &str,
    company_id: Uuid,
    order_id: Uuid,
    delivery_person_id: Uuid,
) -> Res<OrderDetail> {
    let person = active_delivery_person(pool, company_id, delivery_person_id).await?;

    let mut tx = pool.begin().await?;
    let current = db::order::get_order_for_update(&mut *tx, company_id, order_id).await?;
    let mut order = current;
    for next in assignment_path(order.status)? {
        ensure_transition(order.status, next)?;
        order = db::order::set_status(&mut *tx, order_id, next).await?;
    }
    let delivery =
        db::delivery::upsert_for_order(&mut *tx, company_id, order_id, person.id).await?;
    tx.commit().await?;

    log::info!("Order {} assigned to {}", order_id, person.id);
    push::notify_best_effort(http, push_api_url, person.push_token.as_deref(), |to| {
        PushMessage::new(
            to,
            "Nuevo pedido asignado",
            &format!("Tienes una entrega por ${}", order.amount),
        )
        .with_data(serde_json::json!({ "order_id": order.id, "delivery_id": delivery.id }))
    })
    .await;

    Ok(OrderDetail {
        order,
        delivery: Some(delivery),
    })
}

/// IN_DELIVERY -> PENDING, removing the pending delivery.
pub async fn unassign(pool: &PgPool, company_id: Uuid, order_id: Uuid) -> Res<Order> {
    let mut tx = pool.begin().await?;
    let current = db::order::get_order_for_update(&mut *tx, company_id, order_id).await?;
    ensure_editable(current.status)?;
    if current.status != OrderStatus::InDelivery {
        return Err(AppError::BadRequest(
            "El pedido no está asignado a un domiciliario".to_string(),
        ));
    }
    ensure_transition(current.status, OrderStatus::Pending)?;

    db::delivery::delete_pending_for_order(&mut *tx, order_id).await?;
    let order = db::order::set_status(&mut *tx, order_id, OrderStatus::Pending).await?;
    tx.commit().await?;
    Ok(order)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            role,
        }
    }

    fn order(vendor_id: Option<Uuid>) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            visit_id: None,
            vendor_id,
            amount: 120_000,
            status: OrderStatus::InDelivery,
            notes: None,
            invoice_number: None,
            invoice_cufe: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn delivery(order: &Order, person: Uuid) -> Delivery {
        let now = Utc::now();
        Delivery {
            id: Uuid::new_v4(),
            order_id: order.id,
            company_id: order.company_id,
            delivery_person_id: person,
            status: DeliveryStatus::Pending,
            notes: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn vendors_read_their_own_orders() {
        let vendor = principal(Role::Vendor);
        assert!(can_read(&vendor, &order(Some(vendor.user_id)), None));
        assert!(!can_read(&vendor, &order(Some(Uuid::new_v4())), None));
        assert!(!can_read(&vendor, &order(None), None));
    }

    #[test]
    fn delivery_people_read_assigned_orders() {
        let courier = principal(Role::Delivery);
        let order = order(None);
        assert!(!can_read(&courier, &order, None));
        assert!(can_read(&courier, &order, Some(&delivery(&order, courier.user_id))));
        assert!(!can_read(&courier, &order, Some(&delivery(&order, Uuid::new_v4()))));
    }

    #[test]
    fn admins_read_everything() {
        assert!(can_read(&principal(Role::Admin), &order(None), None));
    }

    #[test]
    fn vendor_filter_is_forced() {
        let vendor = principal(Role::Vendor);
        assert_eq!(visible_vendor(&vendor, None), Some(vendor.user_id));
        assert_eq!(visible_vendor(&principal(Role::Admin), None), None);
    }

    #[test]
    fn unsaved_invoice_is_reported_with_its_number() {
        let order_id = Uuid::new_v4();
        let issued = IssuedInvoice {
            number: "SETP990000123".to_string(),
            cufe: Some("a1b2c3".to_string()),
        };
        let err = AppError::Internal("connection reset".to_string());

        let message = orphan_invoice_message(order_id, &issued, &err);
        assert!(message.contains("SETP990000123"));
        assert!(message.contains("a1b2c3"));
        assert!(message.contains(&order_id.to_string()));
        assert!(message.contains("connection reset"));

        let without_cufe = IssuedInvoice { cufe: None, ..issued };
        assert!(orphan_invoice_message(order_id, &without_cufe, &err).contains("CUFE -"));
    }
}

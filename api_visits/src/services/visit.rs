use chrono::{DateTime, Days, Duration, NaiveTime, Utc};
use common::{
    enums::Role,
    error::{AppError, Res},
    principal::Principal,
};
use db::{
    dtos::{
        order::OrderCreateRequest,
        visit::{
            ScheduledVisitCreateRequest, ScheduledVisitUpdateRequest, VisitCheckoutRequest,
            VisitCreateRequest,
        },
    },
    models::visit::{ScheduledVisit, Visit},
};
use policy::{
    lifecycle::{CHECKOUT_ORDER_STATUS, checkout_order_amount},
    temperature,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::{
    scheduled::{CreateScheduledVisitRequest, UpdateScheduledVisitRequest},
    visit::{CheckInRequest, CheckOutRequest, CheckOutResponse},
};

/// Last instant of the UTC day containing `now`. Schedules planned for
/// today or earlier are closed by a check-out.
pub fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .map(|tomorrow| tomorrow.and_time(NaiveTime::MIN).and_utc() - Duration::nanoseconds(1))
        .unwrap_or(now)
}

/// Vendors only read their own visits and schedules.
pub fn visible_vendor(principal: &Principal, requested: Option<Uuid>) -> Option<Uuid> {
    if principal.role == Role::Vendor {
        Some(principal.user_id)
    } else {
        requested
    }
}

fn ensure_owner(principal: &Principal, vendor_id: Uuid) -> Res<()> {
    if principal.is_admin() || principal.user_id == vendor_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Solo el vendedor de la visita o un administrador puede cerrarla".to_string(),
        ))
    }
}

pub async fn check_in(pool: &PgPool, principal: &Principal, req: CheckInRequest) -> Res<Visit> {
    let company_id = principal.company_id()?;
    let customer = db::customer::get_customer(pool, company_id, req.customer_id).await?;
    if !customer.active {
        return Err(AppError::BadRequest("El cliente está inactivo".to_string()));
    }

    if let Some(open) = db::visit::find_open_visit(pool, principal.user_id, customer.id).await? {
        return Err(AppError::Conflict(format!(
            "Ya tienes una visita abierta con este cliente desde {}",
            open.check_in_at.format("%Y-%m-%d %H:%M")
        )));
    }

    let visit = db::visit::insert_visit(
        pool,
        VisitCreateRequest {
            company_id,
            customer_id: customer.id,
            vendor_id: principal.user_id,
            latitude: req.latitude,
            longitude: req.longitude,
        },
    )
    .await?;
    log::debug!("Check-in {} vendor={} customer={}", visit.id, visit.vendor_id, customer.id);
    Ok(visit)
}

/// Closes a visit. The result, the customer's last visit, the schedules due
/// today and the order taken (if any) are written atomically.
pub async fn check_out(
    pool: &PgPool,
    principal: &Principal,
    visit_id: Uuid,
    req: CheckOutRequest,
) -> Res<CheckOutResponse> {
    let company_id = principal.company_id()?;
    let amount = checkout_order_amount(req.result, req.order_amount)?;
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    let current = db::visit::get_visit_for_update(&mut *tx, company_id, visit_id).await?;
    ensure_owner(principal, current.vendor_id)?;
    if !current.is_open() {
        return Err(AppError::BadRequest("La visita ya fue cerrada".to_string()));
    }

    let visit = db::visit::check_out(
        &mut *tx,
        visit_id,
        VisitCheckoutRequest {
            result: req.result,
            order_amount: amount,
            notes: req.notes,
            check_out_at: now,
        },
    )
    .await?;

    let customer = db::customer::touch_last_visit(&mut *tx, visit.customer_id, now).await?;
    let completed = db::scheduled_visit::complete_due(
        &mut *tx,
        visit.vendor_id,
        visit.customer_id,
        end_of_day(now),
        now,
    )
    .await?;

    let order = match amount {
        Some(amount) => Some(
            db::order::insert_order(
                &mut *tx,
                OrderCreateRequest {
                    company_id,
                    customer_id: visit.customer_id,
                    visit_id: Some(visit.id),
                    vendor_id: Some(visit.vendor_id),
                    amount,
                    status: CHECKOUT_ORDER_STATUS,
                    notes: None,
                },
            )
            .await?,
        ),
        None => None,
    };

    tx.commit().await?;
    log::info!(
        "Check-out {} result={:?} schedules_closed={} order={:?}",
        visit.id,
        visit.result,
        completed,
        order.as_ref().map(|o| o.id)
    );

    Ok(CheckOutResponse {
        temperature: temperature::classify(customer.last_visit_at, now),
        visit,
        order,
    })
}

pub async fn get_visit(pool: &PgPool, principal: &Principal, visit_id: Uuid) -> Res<Visit> {
    let visit = db::visit::get_visit(pool, principal.company_id()?, visit_id).await?;
    if principal.role == Role::Vendor && visit.vendor_id != principal.user_id {
        return Err(AppError::NotFound("Visita no encontrada".to_string()));
    }
    Ok(visit)
}

/// Admins schedule for any active vendor; vendors schedule for themselves.
pub async fn schedule(
    pool: &PgPool,
    principal: &Principal,
    req: CreateScheduledVisitRequest,
) -> Res<ScheduledVisit> {
    let company_id = principal.company_id()?;
    let vendor_id = match principal.role {
        Role::Vendor => principal.user_id,
        _ => req.vendor_id.ok_or_else(|| {
            AppError::BadRequest("vendor_id es obligatorio".to_string())
        })?,
    };
    ensure_vendor(pool, company_id, vendor_id).await?;
    db::customer::get_customer(pool, company_id, req.customer_id).await?;

    db::scheduled_visit::insert_scheduled_visit(
        pool,
        ScheduledVisitCreateRequest {
            company_id,
            customer_id: req.customer_id,
            vendor_id,
            scheduled_for: req.scheduled_for,
            notes: req.notes,
        },
    )
    .await
}

pub async fn reschedule(
    pool: &PgPool,
    principal: &Principal,
    id: Uuid,
    req: UpdateScheduledVisitRequest,
) -> Res<ScheduledVisit> {
    let company_id = principal.company_id()?;
    let current = db::scheduled_visit::get_scheduled_visit(pool, company_id, id).await?;
    ensure_owner(principal, current.vendor_id)?;
    if current.completed_at.is_some() {
        return Err(AppError::BadRequest(
            "La visita programada ya fue completada".to_string(),
        ));
    }

    if let Some(vendor_id) = req.vendor_id {
        if !principal.is_admin() {
            return Err(AppError::Forbidden(
                "Solo un administrador puede reasignar visitas".to_string(),
            ));
        }
        ensure_vendor(pool, company_id, vendor_id).await?;
    }

    db::scheduled_visit::update_scheduled_visit(
        pool,
        company_id,
        id,
        ScheduledVisitUpdateRequest {
            vendor_id: req.vendor_id,
            scheduled_for: req.scheduled_for,
            notes: req.notes,
        },
    )
    .await
}

pub async fn unschedule(pool: &PgPool, principal: &Principal, id: Uuid) -> Res<()> {
    let company_id = principal.company_id()?;
    let current = db::scheduled_visit::get_scheduled_visit(pool, company_id, id).await?;
    ensure_owner(principal, current.vendor_id)?;
    db::scheduled_visit::delete_scheduled_visit(pool, company_id, id).await
}

async fn ensure_vendor(pool: &PgPool, company_id: Uuid, vendor_id: Uuid) -> Res<()> {
    let vendor = db::user::get_company_user(pool, company_id, vendor_id).await?;
    if vendor.role != Role::Vendor || !vendor.active {
        return Err(AppError::BadRequest(
            "El usuario indicado no es un vendedor activo".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            role,
        }
    }

    #[test]
    fn end_of_day_covers_the_whole_utc_day() {
        let morning = Utc.with_ymd_and_hms(2025, 4, 30, 6, 15, 0).unwrap();
        let end = end_of_day(morning);
        assert_eq!(end.date_naive(), morning.date_naive());
        assert!(end > Utc.with_ymd_and_hms(2025, 4, 30, 23, 59, 59).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn only_owner_or_admin_closes_a_visit() {
        let vendor = principal(Role::Vendor);
        assert!(ensure_owner(&vendor, vendor.user_id).is_ok());
        assert!(matches!(
            ensure_owner(&vendor, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_owner(&principal(Role::Admin), Uuid::new_v4()).is_ok());
        assert!(ensure_owner(&principal(Role::Delivery), Uuid::new_v4()).is_err());
    }

    #[test]
    fn vendors_read_only_their_own_visits() {
        let vendor = principal(Role::Vendor);
        assert_eq!(visible_vendor(&vendor, Some(Uuid::new_v4())), Some(vendor.user_id));
        let requested = Uuid::new_v4();
        assert_eq!(visible_vendor(&principal(Role::Admin), Some(requested)), Some(requested));
    }
}

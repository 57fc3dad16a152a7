use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use common::{
    enums::Role,
    error::{AppError, Res},
    principal::Principal,
};
use policy::temperature::{TemperatureCounts, needs_attention};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::stats::{DashboardStats, DeliveryStats, VendorStats};

/// `[start of day, start of next day)` in UTC.
pub fn day_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// `[first day of month, first day of next month)` in UTC.
pub fn month_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (year, month) = (now.year(), now.month());
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    (start, end)
}

/// Whose numbers a caller may read: their own, or anyone's for admins.
pub fn subject(principal: &Principal, requested: Option<Uuid>, own_role: Role) -> Res<Uuid> {
    if principal.is_admin() {
        return requested.ok_or_else(|| {
            AppError::BadRequest("Indica el usuario a consultar".to_string())
        });
    }
    if principal.role != own_role {
        return Err(AppError::Forbidden(
            "No tienes permisos para realizar esta acción".to_string(),
        ));
    }
    match requested {
        Some(id) if id != principal.user_id => Err(AppError::Forbidden(
            "Solo puedes consultar tus propias estadísticas".to_string(),
        )),
        _ => Ok(principal.user_id),
    }
}

pub async fn dashboard(pool: &PgPool, company_id: Uuid) -> Res<DashboardStats> {
    let now = Utc::now();
    let (day_start, day_end) = day_window(now);
    let (month_start, month_end) = month_window(now);

    let last_visits = db::customer::list_last_visits(pool, company_id, None).await?;
    let orders = db::stats::orders_by_status(pool, company_id).await?;
    let visits_today = db::stats::count_visits(pool, company_id, None, day_start, day_end).await?;
    let sales_today = db::stats::order_totals(pool, company_id, None, day_start, day_end).await?;
    let sales_month =
        db::stats::order_totals(pool, company_id, None, month_start, month_end).await?;

    Ok(DashboardStats {
        customers: TemperatureCounts::tally(last_visits, now),
        orders: orders.into(),
        visits_today,
        sales_today,
        sales_month,
    })
}

pub async fn vendor(pool: &PgPool, company_id: Uuid, vendor_id: Uuid) -> Res<VendorStats> {
    let now = Utc::now();
    let (day_start, day_end) = day_window(now);
    let (month_start, month_end) = month_window(now);

    let visits_today =
        db::stats::count_visits(pool, company_id, Some(vendor_id), day_start, day_end).await?;
    let orders_month =
        db::stats::order_totals(pool, company_id, Some(vendor_id), month_start, month_end).await?;
    let last_visits = db::customer::list_last_visits(pool, company_id, Some(vendor_id)).await?;
    let customers_needing_attention = last_visits
        .iter()
        .filter(|last| needs_attention(**last, now))
        .count() as i64;

    Ok(VendorStats {
        vendor_id,
        visits_today,
        orders_month,
        customers: TemperatureCounts::tally(last_visits, now),
        customers_needing_attention,
    })
}

pub async fn delivery(pool: &PgPool, company_id: Uuid, person_id: Uuid) -> Res<DeliveryStats> {
    let (day_start, _) = day_window(Utc::now());
    let rows = db::stats::deliveries_by_status(pool, company_id, Some(person_id), day_start).await?;
    Ok(rows.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            role,
        }
    }

    #[test]
    fn day_window_is_half_open() {
        let (start, end) = day_window(at(2025, 3, 9, 17));
        assert_eq!(start, at(2025, 3, 9, 0));
        assert_eq!(end, at(2025, 3, 10, 0));
    }

    #[test]
    fn month_window_rolls_over_december() {
        let (start, end) = month_window(at(2024, 12, 31, 23));
        assert_eq!(start, at(2024, 12, 1, 0));
        assert_eq!(end, at(2025, 1, 1, 0));

        let (start, end) = month_window(at(2024, 2, 10, 8));
        assert_eq!(start, at(2024, 2, 1, 0));
        assert_eq!(end, at(2024, 3, 1, 0));
    }

    #[test]
    fn vendors_read_only_their_numbers() {
        let vendor = principal(Role::Vendor);
        assert_eq!(subject(&vendor, None, Role::Vendor).unwrap(), vendor.user_id);
        assert_eq!(
            subject(&vendor, Some(vendor.user_id), Role::Vendor).unwrap(),
            vendor.user_id
        );
        assert!(matches!(
            subject(&vendor, Some(Uuid::new_v4()), Role::Vendor),
            Err(AppError::Forbidden(_))
        ));
        assert!(subject(&vendor, None, Role::Delivery).is_err());
    }

    #[test]
    fn admins_must_name_the_subject() {
        let admin = principal(Role::Admin);
        let target = Uuid::new_v4();
        assert_eq!(subject(&admin, Some(target), Role::Vendor).unwrap(), target);
        assert!(matches!(
            subject(&admin, None, Role::Vendor),
            Err(AppError::BadRequest(_))
        ));
    }
}

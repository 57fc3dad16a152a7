use chrono::Utc;
use common::{
    enums::Role,
    error::{AppError, Res},
    principal::Principal,
};
use db::{
    dtos::{
        customer::{CustomerCreateRequest, CustomerFilter, CustomerUpdateRequest, NearbyQuery},
        visit::VisitFilter,
    },
    models::customer::Customer,
};
use policy::{limits::LimitedResource, temperature::Temperature};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::customer::{
    CreateCustomerRequest, CustomerDetail, CustomerQuery, CustomerView, NearbyCustomerView,
    NearbyParams, RECENT_VISITS, UpdateCustomerRequest,
};

/// Vendors only ever see their own portfolio; other roles may filter.
pub fn visible_vendor(principal: &Principal, requested: Option<Uuid>) -> Option<Uuid> {
    if principal.role == Role::Vendor {
        Some(principal.user_id)
    } else {
        requested
    }
}

fn ensure_visible(principal: &Principal, customer: &Customer) -> Res<()> {
    if principal.role == Role::Vendor && customer.vendor_id != Some(principal.user_id) {
        Err(AppError::NotFound("Cliente no encontrado".to_string()))
    } else {
        Ok(())
    }
}

/// The assigned vendor, when given, must be an active vendor of the tenant.
async fn ensure_vendor(pool: &PgPool, company_id: Uuid, vendor_id: Uuid) -> Res<()> {
    let vendor = db::user::get_company_user(pool, company_id, vendor_id).await?;
    if vendor.role != Role::Vendor || !vendor.active {
        return Err(AppError::BadRequest(
            "El vendedor asignado no es un vendedor activo".to_string(),
        ));
    }
    Ok(())
}

pub async fn list(
    pool: &PgPool,
    principal: &Principal,
    query: CustomerQuery,
) -> Res<Vec<CustomerView>> {
    let customers = db::customer::list_customers(
        pool,
        CustomerFilter {
            company_id: principal.company_id()?,
            vendor_id: visible_vendor(principal, query.vendor_id),
            search: query.search.filter(|s| !s.trim().is_empty()),
        },
    )
    .await?;

    let now = Utc::now();
    Ok(filter_by_temperature(
        customers.into_iter().map(|c| CustomerView::new(c, now)),
        query.temperature,
    ))
}

pub fn filter_by_temperature(
    views: impl Iterator<Item = CustomerView>,
    temperature: Option<Temperature>,
) -> Vec<CustomerView> {
    views
        .filter(|view| temperature.is_none_or(|t| view.temperature == t))
        .collect()
}

pub async fn detail(pool: &PgPool, principal: &Principal, customer_id: Uuid) -> Res<CustomerDetail> {
    let company_id = principal.company_id()?;
    let customer = db::customer::get_customer(pool, company_id, customer_id).await?;
    ensure_visible(principal, &customer)?;

    let recent_visits = db::visit::list_visits(
        pool,
        VisitFilter {
            company_id,
            vendor_id: None,
            customer_id: Some(customer_id),
            from: None,
            to: None,
            limit: RECENT_VISITS,
        },
    )
    .await?;

    Ok(CustomerDetail {
        customer: CustomerView::new(customer, Utc::now()),
        recent_visits,
    })
}

pub async fn nearby(
    pool: &PgPool,
    principal: &Principal,
    params: NearbyParams,
) -> Res<Vec<NearbyCustomerView>> {
    let rows = db::customer::list_nearby(
        pool,
        NearbyQuery {
            company_id: principal.company_id()?,
            vendor_id: visible_vendor(principal, None),
            latitude: params.lat,
            longitude: params.lng,
            radius_km: params.radius_km(),
            limit: params.limit(),
        },
    )
    .await?;

    let now = Utc::now();
    Ok(rows
        .into_iter()
        .map(|row| NearbyCustomerView {
            customer: CustomerView::new(row.customer, now),
            distance_km: row.distance_km,
        })
        .collect())
}

/// Creates a customer under the tenant lock so concurrent creations cannot
/// overshoot the plan.
pub async fn create(
    pool: &PgPool,
    principal: &Principal,
    req: CreateCustomerRequest,
) -> Res<CustomerView> {
    let company_id = principal.company_id()?;
    let vendor_id = if principal.role == Role::Vendor {
        Some(principal.user_id)
    } else {
        req.vendor_id
    };
    if principal.role != Role::Vendor {
        if let Some(vendor_id) = vendor_id {
            ensure_vendor(pool, company_id, vendor_id).await?;
        }
    }

    let mut tx = pool.begin().await?;
    db::limits::reserve_slot(&mut tx, company_id, LimitedResource::Customers).await?;

    let customer = db::customer::insert_customer(
        &mut *tx,
        CustomerCreateRequest {
            company_id,
            vendor_id,
            name: req.name.trim().to_string(),
            business_name: req.business_name,
            nit: req.nit,
            email: req.email.map(|e| e.trim().to_lowercase()),
            phone: req.phone,
            address: req.address.trim().to_string(),
            city: req.city,
            latitude: req.latitude,
            longitude: req.longitude,
            photo_url: req.photo_url,
            notes: req.notes,
        },
    )
    .await?;

    tx.commit().await?;
    log::info!("Customer {} created in company {}", customer.id, company_id);
    Ok(CustomerView::new(customer, Utc::now()))
}

/// Reactivating a customer counts against the plan again.
pub async fn update(
    pool: &PgPool,
    principal: &Principal,
    customer_id: Uuid,
    req: UpdateCustomerRequest,
) -> Res<CustomerView> {
    let company_id = principal.company_id()?;
    if principal.role == Role::Vendor && (req.vendor_id.is_some() || req.active.is_some()) {
        return Err(AppError::Forbidden(
            "Solo un administrador puede reasignar o activar clientes".to_string(),
        ));
    }
    if let Some(vendor_id) = req.vendor_id {
        ensure_vendor(pool, company_id, vendor_id).await?;
    }

    let mut tx = pool.begin().await?;
    let current = db::customer::get_customer(&mut *tx, company_id, customer_id).await?;
    ensure_visible(principal, &current)?;

    if req.active == Some(true) && !current.active {
        db::limits::reserve_slot(&mut tx, company_id, LimitedResource::Customers).await?;
    }

    let customer = db::customer::update_customer(
        &mut *tx,
        company_id,
        customer_id,
        CustomerUpdateRequest {
            vendor_id: req.vendor_id,
            name: req.name.map(|n| n.trim().to_string()),
            business_name: req.business_name,
            nit: req.nit,
            email: req.email.map(|e| e.trim().to_lowercase()),
            phone: req.phone,
            address: req.address.map(|a| a.trim().to_string()),
            city: req.city,
            latitude: req.latitude,
            longitude: req.longitude,
            photo_url: req.photo_url,
            notes: req.notes,
            active: req.active,
        },
    )
    .await?;

    tx.commit().await?;
    Ok(CustomerView::new(customer, Utc::now()))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};

    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            role,
        }
    }

    fn view(last_visit_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> CustomerView {
        let customer: Customer = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "company_id": Uuid::new_v4(),
            "vendor_id": null,
            "name": "Minimercado El Sol",
            "business_name": null,
            "nit": null,
            "email": null,
            "phone": null,
            "address": "Cra 7 # 12-40",
            "city": null,
            "latitude": null,
            "longitude": null,
            "photo_url": null,
            "notes": null,
            "active": true,
            "last_visit_at": last_visit_at,
            "created_at": now,
            "updated_at": now,
        }))
        .unwrap();
        CustomerView::new(customer, now)
    }

    #[test]
    fn vendors_are_pinned_to_their_portfolio() {
        let vendor = principal(Role::Vendor);
        let other = Uuid::new_v4();
        assert_eq!(visible_vendor(&vendor, Some(other)), Some(vendor.user_id));
        assert_eq!(visible_vendor(&vendor, None), Some(vendor.user_id));

        let admin = principal(Role::Admin);
        assert_eq!(visible_vendor(&admin, Some(other)), Some(other));
        assert_eq!(visible_vendor(&admin, None), None);
    }

    #[test]
    fn temperature_filter_keeps_matching_rows() {
        let now = Utc::now();
        let views = vec![
            view(Some(now - Duration::days(1)), now),
            view(Some(now - Duration::days(10)), now),
            view(None, now),
        ];

        let frozen = filter_by_temperature(views.into_iter(), Some(Temperature::Frozen));
        assert_eq!(frozen.len(), 1);
        assert_eq!(frozen[0].days_since_visit, None);
    }

    #[test]
    fn no_temperature_filter_keeps_everything() {
        let now = Utc::now();
        let views = vec![view(None, now), view(Some(now), now)];
        assert_eq!(filter_by_temperature(views.into_iter(), None).len(), 2);
    }

    #[test]
    fn vendors_cannot_see_foreign_customers() {
        let now = Utc::now();
        let vendor = principal(Role::Vendor);
        let mut customer = view(None, now).customer;
        assert!(matches!(
            ensure_visible(&vendor, &customer),
            Err(AppError::NotFound(_))
        ));
        customer.vendor_id = Some(vendor.user_id);
        assert!(ensure_visible(&vendor, &customer).is_ok());
        assert!(ensure_visible(&principal(Role::Admin), &customer).is_ok());
    }
}

use chrono::{DateTime, Utc};
use common::{
    error::{AppError, Res},
    validation::{require_coordinates, require_email, require_non_empty},
};
use db::models::{customer::Customer, visit::Visit};
use policy::temperature::{self, Temperature};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_NEARBY_LIMIT: i64 = 50;
const MAX_NEARBY_LIMIT: i64 = 200;
pub const RECENT_VISITS: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub temperature: Option<Temperature>,
    pub vendor_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
    pub limit: Option<i64>,
}

impl NearbyParams {
    pub fn validate(&self) -> Res<()> {
        require_coordinates(self.lat, self.lng)?;
        if let Some(radius) = self.radius_km {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(AppError::BadRequest(
                    "El radio debe ser mayor a cero".to_string(),
                ));
            }
        }
        if let Some(limit) = self.limit {
            if !(1..=MAX_NEARBY_LIMIT).contains(&limit) {
                return Err(AppError::BadRequest(format!(
                    "El límite debe estar entre 1 y {}",
                    MAX_NEARBY_LIMIT
                )));
            }
        }
        Ok(())
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km.unwrap_or(DEFAULT_RADIUS_KM)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_NEARBY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub vendor_id: Option<Uuid>,
    pub name: String,
    pub business_name: Option<String>,
    pub nit: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

impl CreateCustomerRequest {
    pub fn validate(&self) -> Res<()> {
        require_non_empty(&self.name, "name")?;
        require_non_empty(&self.address, "address")?;
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        validate_location(self.latitude, self.longitude)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    pub vendor_id: Option<Uuid>,
    pub name: Option<String>,
    pub business_name: Option<String>,
    pub nit: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

impl UpdateCustomerRequest {
    pub fn validate(&self) -> Res<()> {
        if let Some(name) = &self.name {
            require_non_empty(name, "name")?;
        }
        if let Some(address) = &self.address {
            require_non_empty(address, "address")?;
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        validate_location(self.latitude, self.longitude)
    }
}

/// Coordinates travel together.
fn validate_location(latitude: Option<f64>, longitude: Option<f64>) -> Res<()> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => require_coordinates(lat, lng),
        (None, None) => Ok(()),
        _ => Err(AppError::BadRequest(
            "latitude y longitude deben enviarse juntas".to_string(),
        )),
    }
}

/// A customer as returned to clients, with its recency computed at read time.
#[derive(Debug, Serialize)]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    pub temperature: Temperature,
    pub days_since_visit: Option<i64>,
}

impl CustomerView {
    pub fn new(customer: Customer, now: DateTime<Utc>) -> Self {
        CustomerView {
            temperature: temperature::classify(customer.last_visit_at, now),
            days_since_visit: temperature::days_since(customer.last_visit_at, now),
            customer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyCustomerView {
    #[serde(flatten)]
    pub customer: CustomerView,
    pub distance_km: f64,
}

#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: CustomerView,
    pub recent_visits: Vec<Visit>,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn customer(last_visit_at: Option<DateTime<Utc>>) -> Customer {
        let at = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        Customer {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            vendor_id: None,
            name: "Tienda La Esquina".to_string(),
            business_name: None,
            nit: None,
            email: None,
            phone: None,
            address: "Calle 10 # 5-20".to_string(),
            city: Some("Cali".to_string()),
            latitude: None,
            longitude: None,
            photo_url: None,
            notes: None,
            active: true,
            last_visit_at,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn view_carries_temperature_and_days() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        let view = CustomerView::new(customer(Some(now - Duration::days(5))), now);
        assert_eq!(view.temperature, Temperature::Warm);
        assert_eq!(view.days_since_visit, Some(5));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["temperature"], "WARM");
        assert_eq!(json["name"], "Tienda La Esquina");
    }

    #[test]
    fn never_visited_customer_is_frozen_without_days() {
        let now = Utc::now();
        let view = CustomerView::new(customer(None), now);
        assert_eq!(view.temperature, Temperature::Frozen);
        assert_eq!(view.days_since_visit, None);
    }

    #[test]
    fn nearby_defaults_and_bounds() {
        let params = NearbyParams {
            lat: 3.45,
            lng: -76.53,
            radius_km: None,
            limit: None,
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.radius_km(), DEFAULT_RADIUS_KM);
        assert_eq!(params.limit(), DEFAULT_NEARBY_LIMIT);

        let far = NearbyParams {
            lat: 95.0,
            ..params
        };
        assert!(far.validate().is_err());
    }

    #[test]
    fn coordinates_must_come_in_pairs() {
        let req = UpdateCustomerRequest {
            latitude: Some(4.6),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(AppError::BadRequest(_))));
    }
}

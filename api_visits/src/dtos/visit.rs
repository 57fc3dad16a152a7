use chrono::{DateTime, Utc};
use common::{
    enums::VisitResult,
    error::{AppError, Res},
    validation::require_coordinates,
};
use db::models::{order::Order, visit::Visit};
use policy::temperature::Temperature;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_VISIT_LIMIT: i64 = 100;
const MAX_VISIT_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub customer_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CheckInRequest {
    pub fn validate(&self) -> Res<()> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => require_coordinates(lat, lng),
            (None, None) => Ok(()),
            _ => Err(AppError::BadRequest(
                "latitude y longitude deben enviarse juntas".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckOutRequest {
    pub result: VisitResult,
    pub order_amount: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckOutResponse {
    pub visit: Visit,
    pub order: Option<Order>,
    pub temperature: Temperature,
}

#[derive(Debug, Deserialize)]
pub struct VisitQuery {
    pub vendor_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl VisitQuery {
    pub fn validate(&self) -> Res<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::BadRequest(
                    "La fecha inicial debe ser anterior a la final".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_VISIT_LIMIT)
            .clamp(1, MAX_VISIT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn query(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>, limit: Option<i64>) -> VisitQuery {
        VisitQuery {
            vendor_id: None,
            customer_id: None,
            from,
            to,
            limit,
        }
    }

    #[test]
    fn reversed_range_is_rejected() {
        let now = Utc::now();
        assert!(query(Some(now), Some(now - Duration::days(1)), None).validate().is_err());
        assert!(query(Some(now - Duration::days(1)), Some(now), None).validate().is_ok());
        assert!(query(None, Some(now), None).validate().is_ok());
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(query(None, None, None).limit(), DEFAULT_VISIT_LIMIT);
        assert_eq!(query(None, None, Some(0)).limit(), 1);
        assert_eq!(query(None, None, Some(10_000)).limit(), MAX_VISIT_LIMIT);
    }

    #[test]
    fn check_in_coordinates_are_optional_but_paired() {
        let mut req = CheckInRequest {
            customer_id: Uuid::new_v4(),
            latitude: None,
            longitude: None,
        };
        assert!(req.validate().is_ok());
        req.longitude = Some(-74.08);
        assert!(req.validate().is_err());
        req.latitude = Some(4.6);
        assert!(req.validate().is_ok());
    }
}

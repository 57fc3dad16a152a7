use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub company_id: Uuid,
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
    pub active: bool,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct NearbyCustomer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub customer: Customer,
    pub distance_km: f64,
}

use uuid::Uuid;

pub struct CustomerCreateRequest {
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
}

#[derive(Default)]
pub struct CustomerUpdateRequest {
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

pub struct CustomerFilter {
    pub company_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub search: Option<String>,
}

pub struct NearbyQuery {
    pub company_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub limit: i64,
}

use db::models::company::Company;
use serde::{Deserialize, Serialize};

use crate::dtos::subscription::SubscriptionView;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub nit: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CompanyDetail {
    pub company: Company,
    #[serde(flatten)]
    pub subscription: SubscriptionView,
}

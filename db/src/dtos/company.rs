pub struct CompanyCreateRequest {
    pub name: String,
    pub nit: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Default)]
pub struct CompanyUpdateRequest {
    pub name: Option<String>,
    pub nit: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
}

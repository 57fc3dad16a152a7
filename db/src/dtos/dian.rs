use uuid::Uuid;

pub struct DianConfigUpsertRequest {
    pub company_id: Uuid,
    pub enabled: bool,
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub numbering_range_id: Option<i32>,
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct DianConfiguration {
    pub company_id: Uuid,
    pub enabled: bool,
    pub api_url: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub numbering_range_id: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

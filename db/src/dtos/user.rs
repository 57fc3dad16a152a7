use common::enums::Role;
use uuid::Uuid;

pub struct UserCreateRequest {
    pub company_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
}

#[derive(Default)]
pub struct UserUpdateRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

pub struct UserFilter {
    pub company_id: Uuid,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

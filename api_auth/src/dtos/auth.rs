use common::{
    error::Res,
    validation::{require_email, require_non_empty, require_password},
};
use db::models::{company::Company, user::User};
use serde::{Deserialize, Serialize};

/// Company signup: the tenant and its first administrator.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub company_name: String,
    pub nit: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Res<()> {
        require_non_empty(&self.company_name, "company_name")?;
        require_non_empty(&self.name, "name")?;
        require_email(&self.email)?;
        require_password(&self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub user: User,
    pub company: Company,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            company_name: "Distribuidora El Sol".to_string(),
            nit: Some("900123456-7".to_string()),
            phone: None,
            address: None,
            city: Some("Medellín".to_string()),
            name: "Laura Gómez".to_string(),
            email: "laura@elsol.com.co".to_string(),
            password: "s3guridad!".to_string(),
        }
    }

    #[test]
    fn complete_signup_is_valid() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn signup_requires_company_and_credentials() {
        let mut req = request();
        req.company_name = " ".to_string();
        assert!(req.validate().is_err());

        let mut req = request();
        req.password = "corta".to_string();
        assert!(req.validate().is_err());

        let mut req = request();
        req.email = "laura".to_string();
        assert!(req.validate().is_err());
    }
}

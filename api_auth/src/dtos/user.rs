use common::{
    enums::Role,
    error::{AppError, Res},
    validation::{require_email, require_non_empty, require_password},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Res<()> {
        require_non_empty(&self.name, "name")?;
        require_email(&self.email)?;
        require_password(&self.password)?;
        ensure_tenant_role(self.role)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Res<()> {
        if let Some(name) = &self.name {
            require_non_empty(name, "name")?;
        }
        if let Some(password) = &self.password {
            require_password(password)?;
        }
        if let Some(role) = self.role {
            ensure_tenant_role(role)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct PushTokenRequest {
    pub push_token: Option<String>,
}

/// Tenants can only hand out tenant roles.
fn ensure_tenant_role(role: Role) -> Res<()> {
    if role == Role::Superadmin {
        Err(AppError::Forbidden(
            "No se puede asignar el rol SUPERADMIN".to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenants_cannot_create_superadmins() {
        let req = CreateUserRequest {
            email: "root@empresa.co".to_string(),
            name: "Root".to_string(),
            phone: None,
            role: Role::Superadmin,
            password: "12345678".to_string(),
        };
        assert!(matches!(req.validate(), Err(AppError::Forbidden(_))));

        let update = UpdateUserRequest {
            role: Some(Role::Superadmin),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateUserRequest::default().validate().is_ok());
    }
}

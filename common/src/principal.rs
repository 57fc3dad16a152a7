use actix_web::{HttpMessage, HttpResponse, dev::ServiceRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    enums::Role,
    error::{AppError, Res},
    jwt::JwtClaims,
};

/// Authenticated caller, identical for cookie sessions and bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub role: Role,
}

impl From<JwtClaims> for Principal {
    fn from(claims: JwtClaims) -> Self {
        Principal {
            user_id: claims.user_id,
            company_id: claims.company_id,
            role: claims.role,
        }
    }
}

impl Principal {
    /// Tenant of the caller. Superadmins have none and are refused here.
    pub fn company_id(&self) -> Res<Uuid> {
        self.company_id
            .ok_or_else(|| AppError::Forbidden("Esta acción requiere una empresa".to_string()))
    }

    pub fn require_role(&self, roles: &[Role]) -> Res<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "No tienes permisos para realizar esta acción".to_string(),
            ))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin
    }
}

pub fn get_principal_or_error(req: &ServiceRequest) -> Result<Principal, HttpResponse> {
    if let Some(principal_res) = req.extensions().get::<Res<Principal>>() {
        match principal_res {
            Ok(principal) => Ok(principal.clone()),
            Err(app_error) => Err(app_error.to_http_response()),
        }
    } else {
        Err(AppError::Unauthorized("No se encontró una sesión activa".to_string())
            .to_http_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role, company_id: Option<Uuid>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            company_id,
            role,
        }
    }

    #[test]
    fn company_id_is_required_for_tenant_actions() {
        let tenant = Uuid::new_v4();
        assert_eq!(principal(Role::Admin, Some(tenant)).company_id().unwrap(), tenant);
        assert!(matches!(
            principal(Role::Superadmin, None).company_id(),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn role_check_is_an_allow_list() {
        let vendor = principal(Role::Vendor, Some(Uuid::new_v4()));
        assert!(vendor.require_role(&[Role::Admin, Role::Vendor]).is_ok());
        assert!(vendor.require_role(&[Role::Admin]).is_err());
    }

    #[test]
    fn principal_keeps_claims_identity() {
        let claims = JwtClaims {
            user_id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            role: Role::Delivery,
            exp: 0,
        };
        let principal = Principal::from(claims.clone());
        assert_eq!(principal.user_id, claims.user_id);
        assert_eq!(principal.company_id, claims.company_id);
        assert_eq!(principal.role, Role::Delivery);
    }
}

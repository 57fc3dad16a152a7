use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    enums::Role,
    env_config::JwtConfig,
    error::{AppError, Res},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub role: Role,
    pub exp: usize,
}

pub struct ClaimsSpec {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub role: Role,
}

/// Generates JWT token based on user object and JWT configuration options
pub fn generate_jwt(spec: ClaimsSpec, config: &JwtConfig) -> Res<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.expiration_hours))
        .ok_or_else(|| AppError::Internal("Invalid token expiration".to_string()))?
        .timestamp();

    let claims = JwtClaims {
        user_id: spec.user_id,
        company_id: spec.company_id,
        role: spec.role,
        exp: expiration as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(AppError::from)
}

/// Extracts claims object from JWT token.
/// Requires JWT secret.
pub fn validate_jwt(token: &str, secret: &str) -> Res<JwtClaims> {
    let token_data = jsonwebtoken::decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            expiration_hours: 1,
        }
    }

    #[test]
    fn generated_token_validates_with_same_secret() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let token = generate_jwt(
            ClaimsSpec {
                user_id,
                company_id: Some(company_id),
                role: Role::Vendor,
            },
            &config(),
        )
        .unwrap();

        let claims = validate_jwt(&token, &config().secret).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.company_id, Some(company_id));
        assert_eq!(claims.role, Role::Vendor);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_jwt(
            ClaimsSpec {
                user_id: Uuid::new_v4(),
                company_id: None,
                role: Role::Superadmin,
            },
            &config(),
        )
        .unwrap();

        assert!(validate_jwt(&token, "another-secret-another-secret-xx").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = JwtConfig {
            expiration_hours: -2,
            ..config()
        };
        let token = generate_jwt(
            ClaimsSpec {
                user_id: Uuid::new_v4(),
                company_id: None,
                role: Role::Admin,
            },
            &expired,
        )
        .unwrap();

        assert!(validate_jwt(&token, &config().secret).is_err());
    }
}

use common::{
    error::{AppError, Res},
    validation::require_non_empty,
};
use db::models::dian::DianConfiguration;
use serde::{Deserialize, Serialize};

/// Secrets may be omitted on update to keep the stored ones.
#[derive(Debug, Deserialize)]
pub struct DianConfigRequest {
    pub enabled: bool,
    pub api_url: Option<String>,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub username: String,
    pub password: Option<String>,
    pub numbering_range_id: Option<i32>,
}

impl DianConfigRequest {
    pub fn validate(&self) -> Res<()> {
        require_non_empty(&self.client_id, "client_id")?;
        require_non_empty(&self.username, "username")?;
        if let Some(api_url) = &self.api_url {
            let parsed = url::Url::parse(api_url)
                .map_err(|_| AppError::BadRequest("api_url no es una URL válida".to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::BadRequest(
                    "api_url debe usar http o https".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Picks the secret from the request, falling back to the stored one.
pub fn resolve_secret(
    provided: Option<String>,
    stored: Option<&str>,
    field: &str,
) -> Res<String> {
    match provided.filter(|s| !s.is_empty()) {
        Some(secret) => Ok(secret),
        None => stored.map(str::to_string).ok_or_else(|| {
            AppError::BadRequest(format!("El campo {} es obligatorio", field))
        }),
    }
}

/// Configuration as shown to admins. Secrets never leave the server.
#[derive(Debug, Serialize)]
pub struct DianConfigView {
    pub configured: bool,
    pub config: Option<DianConfiguration>,
    pub has_client_secret: bool,
    pub has_password: bool,
}

impl From<Option<DianConfiguration>> for DianConfigView {
    fn from(config: Option<DianConfiguration>) -> Self {
        DianConfigView {
            configured: config.is_some(),
            has_client_secret: config.as_ref().is_some_and(|c| !c.client_secret.is_empty()),
            has_password: config.as_ref().is_some_and(|c| !c.password.is_empty()),
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BillsQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BillEmailRequest {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(api_url: Option<&str>) -> DianConfigRequest {
        DianConfigRequest {
            enabled: true,
            api_url: api_url.map(str::to_string),
            client_id: "client".to_string(),
            client_secret: None,
            username: "facturas@empresa.co".to_string(),
            password: None,
            numbering_range_id: Some(4),
        }
    }

    #[test]
    fn omitted_secret_keeps_stored_one() {
        assert_eq!(resolve_secret(None, Some("old"), "password").unwrap(), "old");
        assert_eq!(
            resolve_secret(Some("new".to_string()), Some("old"), "password").unwrap(),
            "new"
        );
        assert_eq!(
            resolve_secret(Some(String::new()), Some("old"), "password").unwrap(),
            "old"
        );
    }

    #[test]
    fn first_configuration_requires_secrets() {
        assert!(matches!(
            resolve_secret(None, None, "client_secret"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn api_url_must_be_http() {
        assert!(request(None).validate().is_ok());
        assert!(request(Some("https://api.factus.com.co")).validate().is_ok());
        assert!(request(Some("ftp://api.factus.com.co")).validate().is_err());
        assert!(request(Some("not a url")).validate().is_err());
    }

    #[test]
    fn view_never_serializes_secrets() {
        let view = DianConfigView::from(None);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["configured"], false);
        assert!(json["config"].is_null());
    }
}

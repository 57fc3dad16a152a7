use common::{
    error::{AppError, Res},
    validation::{require_non_empty, require_non_negative},
};
use policy::limits::UNLIMITED;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_monthly: i64,
    pub max_vendors: i32,
    pub max_customers: i32,
    pub max_delivery_people: i32,
    #[serde(default)]
    pub dian_enabled: bool,
    #[serde(default)]
    pub reports_enabled: bool,
    #[serde(default)]
    pub api_access: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_monthly: Option<i64>,
    pub max_vendors: Option<i32>,
    pub max_customers: Option<i32>,
    pub max_delivery_people: Option<i32>,
    pub dian_enabled: Option<bool>,
    pub reports_enabled: Option<bool>,
    pub api_access: Option<bool>,
    pub active: Option<bool>,
}

/// Limits are a count or -1 for unlimited.
fn require_limit(value: i32, field: &str) -> Res<()> {
    if value == UNLIMITED || value >= 0 {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "El campo {} debe ser -1 (ilimitado) o un número positivo",
            field
        )))
    }
}

impl CreatePlanRequest {
    pub fn validate(&self) -> Res<()> {
        require_non_empty(&self.name, "name")?;
        require_non_negative(self.price_monthly, "price_monthly")?;
        require_limit(self.max_vendors, "max_vendors")?;
        require_limit(self.max_customers, "max_customers")?;
        require_limit(self.max_delivery_people, "max_delivery_people")
    }
}

impl UpdatePlanRequest {
    pub fn validate(&self) -> Res<()> {
        if let Some(name) = &self.name {
            require_non_empty(name, "name")?;
        }
        if let Some(price) = self.price_monthly {
            require_non_negative(price, "price_monthly")?;
        }
        for (value, field) in [
            (self.max_vendors, "max_vendors"),
            (self.max_customers, "max_customers"),
            (self.max_delivery_people, "max_delivery_people"),
        ] {
            if let Some(value) = value {
                require_limit(value, field)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_accept_unlimited_and_counts() {
        assert!(require_limit(-1, "max_vendors").is_ok());
        assert!(require_limit(0, "max_vendors").is_ok());
        assert!(require_limit(25, "max_vendors").is_ok());
        assert!(require_limit(-2, "max_vendors").is_err());
    }

    #[test]
    fn update_checks_only_present_fields() {
        assert!(UpdatePlanRequest::default().validate().is_ok());
        let bad = UpdatePlanRequest {
            max_customers: Some(-5),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}

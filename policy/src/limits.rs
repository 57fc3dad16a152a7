use common::{
    enums::Role,
    error::{AppError, Res},
};

/// Plan value meaning "no limit".
pub const UNLIMITED: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedResource {
    Customers,
    Vendors,
    DeliveryPeople,
}

impl LimitedResource {
    /// Users with these roles count against the plan.
    pub fn for_role(role: Role) -> Option<LimitedResource> {
        match role {
            Role::Vendor => Some(LimitedResource::Vendors),
            Role::Delivery => Some(LimitedResource::DeliveryPeople),
            Role::Admin | Role::Superadmin => None,
        }
    }

    /// Key used to serialize concurrent creations of this resource per tenant.
    pub fn lock_key(&self) -> &'static str {
        match self {
            LimitedResource::Customers => "customers",
            LimitedResource::Vendors => "vendors",
            LimitedResource::DeliveryPeople => "delivery",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            LimitedResource::Customers => "clientes",
            LimitedResource::Vendors => "vendedores",
            LimitedResource::DeliveryPeople => "domiciliarios",
        }
    }
}

pub fn is_unlimited(max: i32) -> bool {
    max == UNLIMITED
}

/// Rejects the creation of one more `resource` when `current` active rows
/// already reached the plan maximum.
pub fn ensure_within_limit(resource: LimitedResource, max: i32, current: i64) -> Res<()> {
    if is_unlimited(max) || current < i64::from(max) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Has alcanzado el límite de {} {} de tu plan. Actualiza tu plan para agregar más.",
            max,
            resource.label()
        )))
    }
}

use actix_web::web::{self};

pub mod routes {
    pub mod company;
    pub mod plan;
    pub mod subscription;
}

mod services {
    pub(crate) mod subscription;
}

mod dtos {
    pub(crate) mod company;
    pub(crate) mod plan;
    pub(crate) mod subscription;
}

/// Tenant view of its own subscription.
pub fn mount_subscription() -> actix_web::Scope {
    web::scope("/subscription").service(routes::subscription::get_current)
}

/// Superadmin management of plans, companies and their subscriptions.
pub fn mount_admin(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/plans")
            .service(routes::plan::get_plans)
            .service(routes::plan::post_plan)
            .service(routes::plan::patch_plan),
    )
    .service(
        web::scope("/companies")
            .service(routes::company::get_companies)
            .service(routes::company::get_company)
            .service(routes::company::patch_company)
            .service(routes::company::put_subscription),
    );
}

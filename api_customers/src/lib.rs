use actix_web::web;

pub mod routes {
    pub mod customer;
}

mod services {
    pub(crate) mod customer;
}

mod dtos {
    pub(crate) mod customer;
}

/// `/nearby` must be registered before `/{id}`.
pub fn mount_customers() -> actix_web::Scope {
    web::scope("/customers")
        .service(routes::customer::get_nearby)
        .service(routes::customer::get_customers)
        .service(routes::customer::get_customer)
        .service(routes::customer::post_customer)
        .service(routes::customer::patch_customer)
        .service(routes::customer::delete_customer)
}

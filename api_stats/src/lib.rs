use actix_web::web;

pub mod routes {
    pub mod stats;
}

mod services {
    pub(crate) mod stats;
}

mod dtos {
    pub(crate) mod stats;
}

pub fn mount_stats() -> actix_web::Scope {
    web::scope("/stats")
        .service(routes::stats::get_dashboard)
        .service(routes::stats::get_vendor_stats)
        .service(routes::stats::get_delivery_stats)
}

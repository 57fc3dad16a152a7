use actix_web::web;

pub mod client;

pub mod routes {
    pub mod bill;
    pub mod config;
}

pub mod services {
    pub mod invoice;
}

mod dtos {
    pub(crate) mod config;
}

pub fn mount_dian() -> actix_web::Scope {
    web::scope("/dian")
        .service(routes::config::get_config)
        .service(routes::config::put_config)
        .service(routes::bill::get_bills)
        .service(routes::bill::post_bill_email)
}

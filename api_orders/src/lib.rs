use actix_web::web;

pub mod routes {
    pub mod delivery;
    pub mod order;
}

mod services {
    pub(crate) mod delivery;
    pub(crate) mod order;
}

mod dtos {
    pub(crate) mod delivery;
    pub(crate) mod order;
}

pub fn mount_orders(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .service(routes::order::get_orders)
            .service(routes::order::get_order)
            .service(routes::order::post_order)
            .service(routes::order::patch_order)
            .service(routes::order::post_approve)
            .service(routes::order::post_assign)
            .service(routes::order::post_unassign),
    )
    .service(
        web::scope("/deliveries")
            .service(routes::delivery::get_deliveries)
            .service(routes::delivery::post_complete),
    );
}

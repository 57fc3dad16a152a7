use actix_web::web;

pub mod routes {
    pub mod scheduled;
    pub mod visit;
}

mod services {
    pub(crate) mod visit;
}

mod dtos {
    pub(crate) mod scheduled;
    pub(crate) mod visit;
}

pub fn mount_visits(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/visits")
            .service(routes::visit::post_check_in)
            .service(routes::visit::post_check_out)
            .service(routes::visit::get_visits)
            .service(routes::visit::get_visit),
    )
    .service(
        web::scope("/scheduled-visits")
            .service(routes::scheduled::get_scheduled_visits)
            .service(routes::scheduled::post_scheduled_visit)
            .service(routes::scheduled::patch_scheduled_visit)
            .service(routes::scheduled::delete_scheduled_visit),
    );
}

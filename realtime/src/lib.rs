use actix_web::web;

pub mod broadcaster;

pub mod routes {
    pub mod location;
}

pub use broadcaster::{Broadcaster, LocationUpdate};

/// Location posting is exempt from the write guard, see `limiter::write_guard`.
pub fn mount_locations() -> actix_web::Scope {
    web::scope("/locations")
        .service(routes::location::get_stream)
        .service(routes::location::post_location)
}

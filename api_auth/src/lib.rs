use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::{
    cookie::{Key, SameSite, time::Duration},
    web,
};
use common::enums::Role;
use limiter::middleware::login::LoginRateLimiter;
use middleware::auth::AuthMiddleware;

pub mod middleware {
    pub mod auth;
}

pub mod routes {
    pub mod auth;
    pub mod session;
    pub mod user;
}

mod services {
    pub(crate) mod auth;
    pub(crate) mod user;
}

mod dtos {
    pub(crate) mod auth;
    pub(crate) mod user;
}

/// Encrypted cookie session holding the token of web logins.
/// The key is derived from the JWT secret.
pub fn session_middleware(
    cookie_secure: bool,
    is_production: bool,
    secret: &[u8],
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::derive_from(secret))
        .cookie_name("distriapp_session".to_string())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(if is_production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .cookie_content_security(CookieContentSecurity::Private)
        .session_lifecycle(PersistentSession::default().session_ttl(Duration::days(1)))
        .build()
}

/// Any authenticated principal.
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new(None)
}

/// Authenticated principals holding one of `roles`.
pub fn role_middleware(roles: &'static [Role]) -> AuthMiddleware {
    AuthMiddleware::new(Some(roles))
}

pub fn mount_auth(login_limiter: LoginRateLimiter) -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::post_register)
        .service(
            web::resource("/login")
                .wrap(login_limiter.clone())
                .route(web::post().to(routes::auth::post_login)),
        )
        .service(
            web::resource("/mobile/login")
                .wrap(login_limiter)
                .route(web::post().to(routes::auth::post_mobile_login)),
        )
        .service(routes::auth::post_logout)
        .service(routes::session::get_session)
}

/// `/me` and `/users` live at the root of the tenant scope.
pub fn mount_user(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::user::get_me)
        .service(routes::user::put_push_token)
        .service(routes::user::get_users)
        .service(routes::user::post_user)
        .service(routes::user::patch_user)
        .service(routes::user::delete_user);
}

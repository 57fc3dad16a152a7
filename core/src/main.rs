mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::{enums::Role, env_config::Config, error::AppError};
use realtime::Broadcaster;

/// Writes that stay open while the subscription is read-only.
const WRITE_GUARD_EXEMPT: &[&str] = &["/me/push-token", "/locations"];

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.is_production();
    let origin = config.cors_allowed_origin.clone();
    let cookie_secure = !origin.contains("localhost");

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // location fan-out: Redis when configured, in-process otherwise
    let broadcaster =
        Broadcaster::from_url(&config.redis_url).expect("Failed to set up location broadcaster");

    // shared client for push and invoicing providers
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(20))
        .build()
        .expect("Failed to build HTTP client");

    // one login limiter shared by every worker, so per-IP budgets are global
    let login_limiter = limiter::login_middleware(config.login_rate_limit);
    let global_rate_limit = config.global_rate_limit;

    log::info!(
        "Starting server on {}:{} ({} workers)",
        config.server_host,
        config.server_port,
        config.num_workers
    );

    HttpServer::new(move || {
        let secret = config_data.jwt_config.secret.as_bytes();
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(broadcaster.clone()))
            .app_data(web::Data::new(http_client.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Cuerpo de la petición inválido: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Parámetros inválidos: {}", err)).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Ruta inválida: {}", err)).into()
            }))
            .wrap(limiter::global_middleware(global_rate_limit)) // 5th
            .wrap(logger::middleware()) // 4th
            .wrap(extractor::middleware()) // 3rd
            .wrap(cors::middleware(&origin)) // 2nd
            .wrap(api_auth::session_middleware(
                cookie_secure,
                is_production,
                secret,
            )) // 1st
            .service(
                web::scope("/api")
                    .service(api_auth::mount_auth(login_limiter.clone()))
                    .service(
                        web::scope("/admin")
                            .wrap(api_auth::role_middleware(&[Role::Superadmin]))
                            .configure(api_subs::mount_admin),
                    )
                    .service(
                        web::scope("")
                            .wrap(limiter::write_guard(WRITE_GUARD_EXEMPT)) // after auth
                            .wrap(api_auth::auth_middleware())
                            .configure(api_auth::mount_user)
                            .service(api_subs::mount_subscription())
                            .service(api_customers::mount_customers())
                            .configure(api_visits::mount_visits)
                            .configure(api_orders::mount_orders)
                            .service(api_stats::mount_stats())
                            .service(api_dian::mount_dian())
                            .service(realtime::mount_locations()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}

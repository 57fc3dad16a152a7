use std::{future::Future, pin::Pin, sync::Arc};

use actix_session::SessionExt;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use futures::future::{Ready, ok};

use common::{
    env_config::Config,
    error::{AppError, Res},
    jwt,
    principal::Principal,
};

use crate::SESSION_TOKEN_KEY;

/// Resolves the caller from a bearer token or, failing that, from the token
/// kept in the cookie session. The outcome is stored as `Res<Principal>` in the
/// request extensions; requests carrying neither are left untouched.
pub struct ExtractionMiddleware {}

impl ExtractionMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl<S, B> Transform<S, ServiceRequest> for ExtractionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = ExtractionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ExtractionMiddlewareService {
            service: Arc::new(service),
        })
    }
}

pub struct ExtractionMiddlewareService<S> {
    service: Arc<S>,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
}

fn session_token(req: &ServiceRequest) -> Option<String> {
    req.get_session()
        .get::<String>(SESSION_TOKEN_KEY)
        .unwrap_or_else(|err| {
            log::warn!("Unreadable session cookie: {}", err);
            None
        })
}

impl<S, B> Service<ServiceRequest> for ExtractionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = bearer_token(&req).or_else(|| session_token(&req));
        let secret = req
            .app_data::<web::Data<Arc<Config>>>()
            .map(|config| config.jwt_config.secret.clone());
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            if let Some(token) = token {
                let principal_res: Res<Principal> = match secret {
                    Some(secret) => jwt::validate_jwt(&token, &secret).map(Principal::from),
                    None => Err(AppError::Internal(
                        "Configuration is not registered as app data".to_string(),
                    )),
                };
                req.extensions_mut().insert::<Res<Principal>>(principal_res);
            }
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpRequest, HttpResponse, test};
    use common::{
        enums::Role,
        env_config::JwtConfig,
        jwt::{ClaimsSpec, generate_jwt},
    };
    use uuid::Uuid;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config() -> Arc<Config> {
        Arc::new(Config {
            environment: "development".to_string(),
            database_url: String::new(),
            redis_url: String::new(),
            jwt_config: JwtConfig {
                secret: SECRET.to_string(),
                expiration_hours: 1,
            },
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            num_workers: 1,
            cors_allowed_origin: String::new(),
            console_logging_enabled: false,
            trial_days: 14,
            global_rate_limit: 50,
            login_rate_limit: 5,
            push_api_url: String::new(),
            invoicing_api_url: String::new(),
        })
    }

    async fn describe(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<Res<Principal>>() {
            Some(Ok(principal)) => HttpResponse::Ok().body(principal.role.to_string()),
            Some(Err(_)) => HttpResponse::Ok().body("invalid"),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[actix_web::test]
    async fn bearer_token_becomes_principal() {
        let token = generate_jwt(
            ClaimsSpec {
                user_id: Uuid::new_v4(),
                company_id: Some(Uuid::new_v4()),
                role: Role::Vendor,
            },
            &config().jwt_config,
        )
        .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config()))
                .wrap(ExtractionMiddleware::new())
                .route("/", web::get().to(describe)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "VENDOR");
    }

    #[actix_web::test]
    async fn forged_token_is_recorded_as_error() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config()))
                .wrap(ExtractionMiddleware::new())
                .route("/", web::get().to(describe)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "invalid");
    }

    #[actix_web::test]
    async fn request_without_credentials_stays_anonymous() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config()))
                .wrap(ExtractionMiddleware::new())
                .route("/", web::get().to(describe)),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous");
    }
}

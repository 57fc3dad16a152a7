use std::{sync::Arc, time::Instant};

use actix_web::{
    Error, HttpMessage,
    body::{self, BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use colored::Colorize;
use common::{env_config::Config, error::Res, principal::Principal};
use futures::future::{LocalBoxFuture, Ready, ready};
use log::{debug, info};
use uuid::Uuid;

/// Console access log: method, path, status, latency and the caller's ids.
/// Bodies of failed responses are echoed at debug level.
pub struct LoggerMiddleware {}

impl LoggerMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService {
            service: Arc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Arc<S>,
}

fn display_id(id: Option<Uuid>) -> String {
    id.map_or("None".to_string(), |id| id.to_string())
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let query_string = req.query_string().to_string();

        let (user_id, company_id) = match req.extensions().get::<Res<Principal>>() {
            Some(Ok(principal)) => (Some(principal.user_id), principal.company_id),
            _ => (None, None),
        };

        let console_logging_enabled = req
            .app_data::<web::Data<Arc<Config>>>()
            .map(|config| config.console_logging_enabled)
            .unwrap_or(true);
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            let res = srv.call(req).await?.map_into_boxed_body();
            if !console_logging_enabled {
                return Ok(res);
            }

            let status = res.status();
            let status_code = status.as_u16();
            let elapsed_ms = started.elapsed().as_millis();

            let colored_status = match status_code {
                200..=299 => status_code.to_string().green(),
                300..=399 => status_code.to_string().yellow(),
                400..=499 => status_code.to_string().bright_red(),
                _ => status_code.to_string().red(),
            };

            let colored_method = match method.as_str() {
                "GET" => method.blue(),
                "POST" => method.yellow(),
                "PUT" => method.purple(),
                "PATCH" => method.cyan(),
                "DELETE" => method.red(),
                _ => method.normal(),
            };

            info!(
                "[{}] {} {}{} {} company_id={} user_id={}",
                colored_status,
                colored_method,
                path.bright_white(),
                if query_string.is_empty() {
                    String::new()
                } else {
                    format!("?{}", query_string)
                },
                format!("({}ms)", elapsed_ms).bright_black(),
                display_id(company_id).bright_blue(),
                display_id(user_id).bright_blue(),
            );

            if !(status.is_client_error() || status.is_server_error()) {
                return Ok(res);
            }

            // Error bodies are small JSON documents; buffer and re-attach them.
            let (req, res) = res.into_parts();
            let (res, res_body) = res.into_parts();
            let bytes = body::to_bytes(res_body)
                .await
                .map_err(actix_web::error::ErrorInternalServerError)?;
            debug!(
                "  Response: {}",
                String::from_utf8_lossy(&bytes).bright_yellow()
            );
            let res = res.set_body(BoxBody::new(bytes));
            Ok(ServiceResponse::new(req, res))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{
        App, HttpResponse,
        http::StatusCode,
        test::{TestRequest, call_and_read_body, call_service, init_service, read_body},
    };

    use super::*;

    #[actix_web::test]
    async fn error_bodies_survive_logging() {
        let app = init_service(
            App::new().wrap(LoggerMiddleware::new()).route(
                "/missing",
                web::get().to(|| async {
                    HttpResponse::NotFound().json(serde_json::json!({ "error": "Cliente no encontrado" }))
                }),
            ),
        )
        .await;

        let res = call_service(&app, TestRequest::get().uri("/missing").to_request())
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = read_body(res).await;
        assert_eq!(body, r#"{"error":"Cliente no encontrado"}"#);
    }

    #[actix_web::test]
    async fn successful_responses_are_passed_through() {
        let app = init_service(
            App::new()
                .wrap(LoggerMiddleware::new())
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().body("fine") })),
        )
        .await;

        let body = call_and_read_body(&app, TestRequest::get().uri("/ok").to_request())
            .await;
        assert_eq!(body, "fine");
    }

    #[test]
    fn missing_ids_render_as_none() {
        assert_eq!(display_id(None), "None");
        let id = Uuid::new_v4();
        assert_eq!(display_id(Some(id)), id.to_string());
    }
}

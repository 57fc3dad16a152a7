use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::{enums::Role, principal::get_principal_or_error};
use futures::future::{Ready, ok};

/// Lets through only requests whose principal was resolved, optionally
/// restricted to a set of roles. The principal is then available to
/// handlers as `web::ReqData<Principal>`.
pub struct AuthMiddleware {
    roles: Option<&'static [Role]>,
}

impl AuthMiddleware {
    pub fn new(roles: Option<&'static [Role]>) -> Self {
        AuthMiddleware { roles }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            roles: self.roles,
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    roles: Option<&'static [Role]>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let roles = self.roles;

        Box::pin(async move {
            let principal = match get_principal_or_error(&req) {
                Ok(principal) => principal,
                Err(response) => return Ok(req.into_response(response)),
            };

            if let Some(roles) = roles {
                if let Err(err) = principal.require_role(roles) {
                    log::warn!(
                        "User {} with role {} refused on {}",
                        principal.user_id,
                        principal.role,
                        req.path()
                    );
                    return Ok(req.into_response(err.to_http_response()));
                }
            }

            req.extensions_mut().insert(principal);
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};
    use common::{error::{AppError, Res}, principal::Principal};
    use uuid::Uuid;

    use super::*;

    async fn whoami(principal: web::ReqData<Principal>) -> HttpResponse {
        HttpResponse::Ok().body(principal.role.to_string())
    }

    fn with_principal(role: Option<Role>) -> test::TestRequest {
        let req = test::TestRequest::get().uri("/");
        if let Some(role) = role {
            req.insert_header(("X-Test-Role", role.to_string()))
        } else {
            req
        }
    }

    macro_rules! app {
        ($middleware:expr) => {
            test::init_service(
                App::new()
                    .wrap($middleware)
                    .wrap_fn(|req, srv| {
                        let role = req
                            .headers()
                            .get("X-Test-Role")
                            .and_then(|v| v.to_str().ok())
                            .map(|v| match v {
                                "SUPERADMIN" => Role::Superadmin,
                                "ADMIN" => Role::Admin,
                                "VENDOR" => Role::Vendor,
                                _ => Role::Delivery,
                            });
                        if let Some(role) = role {
                            req.extensions_mut().insert::<Res<Principal>>(Ok(Principal {
                                user_id: Uuid::new_v4(),
                                company_id: Some(Uuid::new_v4()),
                                role,
                            }));
                        }
                        srv.call(req)
                    })
                    .route("/", web::get().to(whoami)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn anonymous_request_is_unauthorized() {
        let app = app!(AuthMiddleware::new(None));
        let res = test::call_service(&app, with_principal(None).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn principal_reaches_the_handler() {
        let app = app!(AuthMiddleware::new(None));
        let body =
            test::call_and_read_body(&app, with_principal(Some(Role::Vendor)).to_request()).await;
        assert_eq!(body, "VENDOR");
    }

    #[actix_web::test]
    async fn role_restriction_is_enforced() {
        let app = app!(AuthMiddleware::new(Some(&[Role::Superadmin])));
        let res = test::call_service(&app, with_principal(Some(Role::Admin)).to_request()).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res =
            test::call_service(&app, with_principal(Some(Role::Superadmin)).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn invalid_token_is_reported_as_unauthorized() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(None))
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert::<Res<Principal>>(Err(AppError::Unauthorized(
                        "Token inválido o expirado".to_string(),
                    )));
                    srv.call(req)
                })
                .route("/", web::get().to(whoami)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

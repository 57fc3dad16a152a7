use std::{future::Future, pin::Pin, rc::Rc, sync::Arc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
    web,
};
use chrono::Utc;
use common::{
    error::{AppError, Res},
    principal::Principal,
};
use futures::future::LocalBoxFuture;
use policy::subscription::{self, SubscriptionSnapshot};
use sqlx::PgPool;
use uuid::Uuid;

/// Loads the subscription of a tenant. Called with the request so the
/// default lookup can reach the pool registered as app data.
pub type SubscriptionLookup = Arc<
    dyn Fn(&ServiceRequest, Uuid) -> LocalBoxFuture<'static, Res<Option<SubscriptionSnapshot>>>
        + Send
        + Sync,
>;

/// Rejects mutating requests of tenants whose subscription no longer allows
/// writes. Reads always pass so an expired tenant can still see its data.
pub struct WriteGuard {
    exempt: &'static [&'static str],
    lookup: SubscriptionLookup,
}

impl WriteGuard {
    pub fn new(exempt: &'static [&'static str]) -> Self {
        Self::with_lookup(exempt, Arc::new(database_lookup))
    }

    pub fn with_lookup(exempt: &'static [&'static str], lookup: SubscriptionLookup) -> Self {
        WriteGuard { exempt, lookup }
    }
}

fn database_lookup(
    req: &ServiceRequest,
    company_id: Uuid,
) -> LocalBoxFuture<'static, Res<Option<SubscriptionSnapshot>>> {
    let pool = req.app_data::<web::Data<Arc<PgPool>>>().cloned();
    Box::pin(async move {
        let pool = pool.ok_or_else(|| {
            AppError::Internal("Database pool is not registered as app data".to_string())
        })?;
        let pool: &PgPool = &pool;
        let subscription = db::subscription::get_by_company(pool, company_id).await?;
        Ok(subscription.map(|sub| sub.snapshot()))
    })
}

pub fn is_write(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Whether a request must pass the subscription check.
pub fn is_guarded(method: &Method, path: &str, exempt: &[&str]) -> bool {
    let path = path.trim_end_matches('/');
    is_write(method) && !exempt.iter().any(|suffix| path.ends_with(suffix))
}

impl<S, B> Transform<S, ServiceRequest> for WriteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = WriteGuardMiddleware<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(WriteGuardMiddleware {
            service: Rc::new(service),
            exempt: self.exempt,
            lookup: Arc::clone(&self.lookup),
        }))
    }
}

pub struct WriteGuardMiddleware<S> {
    service: Rc<S>,
    exempt: &'static [&'static str],
    lookup: SubscriptionLookup,
}

async fn check_tenant(
    company_id: Uuid,
    lookup: LocalBoxFuture<'static, Res<Option<SubscriptionSnapshot>>>,
) -> Res<()> {
    let snapshot = lookup.await?;
    let verdict = subscription::ensure_writable(snapshot.as_ref(), Utc::now());
    if verdict.is_err() {
        log::info!(
            "Write blocked for company {} (subscription {:?})",
            company_id,
            snapshot.map(|s| s.status)
        );
    }
    verdict
}

impl<S, B> Service<ServiceRequest> for WriteGuardMiddleware<S>
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
        let guarded = is_guarded(req.method(), req.path(), self.exempt);
        let lookup = Arc::clone(&self.lookup);

        Box::pin(async move {
            if !guarded {
                return srv.call(req).await.map(|res| res.map_into_boxed_body());
            }

            // Unauthenticated requests are answered by the auth middleware.
            let principal = match req.extensions().get::<Res<Principal>>() {
                Some(Ok(principal)) => Some(principal.clone()),
                _ => None,
            };

            if let Some(principal) = principal.filter(|p| !p.is_superadmin()) {
                let checked = match principal.company_id() {
                    Ok(company_id) => check_tenant(company_id, lookup(&req, company_id)).await,
                    Err(err) => Err(err),
                };
                if let Err(err) = checked {
                    return Ok(req.error_response(err));
                }
            }

            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{
        App, HttpResponse,
        http::StatusCode,
        test::{TestRequest, call_service, init_service, read_body},
    };
    use chrono::Duration;
    use common::enums::{Role, SubscriptionStatus};
    use futures::{FutureExt, future};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const EXEMPT: &[&str] = &["/me/push-token", "/locations"];

    fn principal(role: Role, company_id: Option<Uuid>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            company_id,
            role,
        }
    }

    fn fixed(snapshot: Option<SubscriptionSnapshot>) -> SubscriptionLookup {
        Arc::new(move |_: &ServiceRequest, _: Uuid| {
            future::ready(Ok::<_, AppError>(snapshot)).boxed_local()
        })
    }

    fn expired() -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            status: SubscriptionStatus::Active,
            trial_ends_at: None,
            current_period_end: Utc::now() - Duration::days(1),
        }
    }

    fn active() -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            status: SubscriptionStatus::Active,
            trial_ends_at: None,
            current_period_end: Utc::now() + Duration::days(30),
        }
    }

    macro_rules! tenant_app {
        ($guard:expr, $principal:expr) => {
            init_service(
                App::new()
                    .wrap($guard)
                    .wrap_fn(move |req, srv| {
                        req.extensions_mut()
                            .insert::<Res<Principal>>(Ok($principal.clone()));
                        srv.call(req)
                    })
                    .route("/api/customers", web::get().to(HttpResponse::Ok))
                    .route("/api/customers", web::post().to(HttpResponse::Created))
                    .route("/api/me/push-token", web::put().to(HttpResponse::Ok)),
            )
            .await
        };
    }

    #[test]
    fn only_writes_are_guarded() {
        assert!(!is_guarded(&Method::GET, "/api/customers", EXEMPT));
        assert!(!is_guarded(&Method::HEAD, "/api/customers", EXEMPT));
        assert!(is_guarded(&Method::POST, "/api/customers", EXEMPT));
        assert!(is_guarded(&Method::PUT, "/api/dian/config", EXEMPT));
        assert!(is_guarded(&Method::PATCH, "/api/orders/1", EXEMPT));
        assert!(is_guarded(&Method::DELETE, "/api/users/1", EXEMPT));
    }

    #[test]
    fn exempt_endpoints_pass_through() {
        assert!(!is_guarded(&Method::PUT, "/api/me/push-token", EXEMPT));
        assert!(!is_guarded(&Method::POST, "/api/locations/", EXEMPT));
        assert!(is_guarded(&Method::POST, "/api/locations/stream-admin", EXEMPT));
    }

    #[actix_web::test]
    async fn expired_tenant_can_read_but_not_write() {
        let admin = principal(Role::Admin, Some(Uuid::new_v4()));
        let app = tenant_app!(WriteGuard::with_lookup(EXEMPT, fixed(Some(expired()))), admin);

        let res = call_service(&app, TestRequest::get().uri("/api/customers").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = call_service(&app, TestRequest::post().uri("/api/customers").to_request()).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = serde_json::from_slice(&read_body(res).await).unwrap();
        assert_eq!(body["error"], subscription::READ_ONLY_MESSAGE);

        let res =
            call_service(&app, TestRequest::put().uri("/api/me/push-token").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn tenant_without_subscription_is_read_only() {
        let vendor = principal(Role::Vendor, Some(Uuid::new_v4()));
        let app = tenant_app!(WriteGuard::with_lookup(EXEMPT, fixed(None)), vendor);

        let res = call_service(&app, TestRequest::post().uri("/api/customers").to_request()).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn active_tenant_writes_go_through() {
        let admin = principal(Role::Admin, Some(Uuid::new_v4()));
        let app = tenant_app!(WriteGuard::with_lookup(EXEMPT, fixed(Some(active()))), admin);

        let res = call_service(&app, TestRequest::post().uri("/api/customers").to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn superadmin_writes_skip_the_subscription_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lookup: SubscriptionLookup = Arc::new(move |_: &ServiceRequest, _: Uuid| {
            counter.fetch_add(1, Ordering::SeqCst);
            future::ready(Ok::<_, AppError>(None)).boxed_local()
        });
        let root = principal(Role::Superadmin, None);
        let app = tenant_app!(WriteGuard::with_lookup(EXEMPT, lookup), root);

        let res = call_service(&app, TestRequest::post().uri("/api/customers").to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn reads_never_touch_the_database() {
        // No pool is registered: reaching the database would answer 500.
        let app = init_service(
            App::new()
                .wrap(WriteGuard::new(EXEMPT))
                .route("/api/customers", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let res = call_service(&app, TestRequest::get().uri("/api/customers").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}

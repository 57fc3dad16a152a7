use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::error::AppError;
use governor::{Quota, RateLimiter, clock::QuantaClock, state::keyed::DashMapStateStore};
use std::{
    future::Future,
    net::{IpAddr, Ipv4Addr},
    num::NonZeroU32,
    pin::Pin,
    rc::Rc,
    sync::Arc,
};

type IpStateStore = DashMapStateStore<IpAddr>;
type IpLimiter = RateLimiter<IpAddr, IpStateStore, QuantaClock>;

/// Throttles credential checks per client address.
#[derive(Clone)]
pub struct LoginRateLimiter {
    limiter: Arc<IpLimiter>,
}

impl LoginRateLimiter {
    pub fn new(attempts_per_minute: u32) -> Self {
        let attempts = NonZeroU32::new(attempts_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(attempts))),
        }
    }
}

/// Address of the caller, honouring `X-Forwarded-For` behind a proxy.
fn client_ip(req: &ServiceRequest) -> IpAddr {
    let info = req.connection_info();
    info.realip_remote_addr()
        .and_then(|addr| {
            addr.parse::<IpAddr>()
                .ok()
                .or_else(|| addr.parse::<std::net::SocketAddr>().ok().map(|s| s.ip()))
        })
        .or_else(|| req.peer_addr().map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

impl<S, B> Transform<S, ServiceRequest> for LoginRateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = LoginRateLimiterService<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoginRateLimiterService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct LoginRateLimiterService<S> {
    service: Rc<S>,
    limiter: Arc<IpLimiter>,
}

impl<S, B> Service<ServiceRequest> for LoginRateLimiterService<S>
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
        let ip = client_ip(&req);
        let allowed = self.limiter.check_key(&ip).is_ok();

        Box::pin(async move {
            if !allowed {
                log::warn!("Login attempts exhausted for {}", ip);
                return Ok(req.error_response(AppError::TooManyRequests(
                    "Demasiados intentos de inicio de sesión. Intenta de nuevo en un minuto."
                        .to_string(),
                )));
            }
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}

use std::{sync::Arc, time::Duration};

use actix_web::{HttpResponse, Responder, get, http::header, post, web};
use chrono::Utc;
use common::{
    enums::Role, error::Res, http::Success, principal::Principal, validation::require_coordinates,
};
use futures::StreamExt;
use serde::Deserialize;
use sqlx::PgPool;

use crate::broadcaster::{Broadcaster, LocationUpdate};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// One server-sent event frame.
pub fn sse_frame(event: &str, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

/// Field users report their position.
#[post("")]
async fn post_location(
    principal: web::ReqData<Principal>,
    req: web::Json<LocationRequest>,
    pool: web::Data<Arc<PgPool>>,
    broadcaster: web::Data<Broadcaster>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Vendor, Role::Delivery])?;
    require_coordinates(req.latitude, req.longitude)?;

    let user = db::user::get_user_by_id(&***pool, principal.user_id).await?;
    let update = LocationUpdate {
        user_id: user.id,
        company_id: principal.company_id()?,
        name: user.name,
        role: principal.role,
        latitude: req.latitude,
        longitude: req.longitude,
        at: Utc::now(),
    };
    broadcaster.publish(&update).await?;
    Success::no_content()
}

/// Live positions of the tenant's field users as `location` events.
#[get("/stream")]
async fn get_stream(
    principal: web::ReqData<Principal>,
    broadcaster: web::Data<Broadcaster>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    let company_id = principal.company_id()?;
    let updates = broadcaster.subscribe(company_id).await?;
    log::debug!("Location stream opened for company {}", company_id);

    let events = updates.map(|payload| sse_frame("location", &payload));
    let heartbeat = futures::stream::unfold(
        tokio::time::interval(HEARTBEAT_INTERVAL),
        |mut interval| async move {
            interval.tick().await;
            Some((": ping\n\n".to_string(), interval))
        },
    );
    let body = futures::stream::select(events, heartbeat)
        .map(|frame| Ok::<_, actix_web::Error>(web::Bytes::from(frame)));

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(body))
}

#[cfg(test)]
mod tests {
    use actix_web::{
        App, HttpMessage,
        dev::Service,
        test::{TestRequest, call_service, init_service},
    };
    use uuid::Uuid;

    use super::*;

    #[test]
    fn frames_follow_event_stream_format() {
        assert_eq!(
            sse_frame("location", r#"{"a":1}"#),
            "event: location\ndata: {\"a\":1}\n\n"
        );
    }

    #[actix_web::test]
    async fn stream_is_admin_only() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(Broadcaster::memory()))
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert(Principal {
                        user_id: Uuid::new_v4(),
                        company_id: Some(Uuid::new_v4()),
                        role: Role::Vendor,
                    });
                    srv.call(req)
                })
                .service(web::scope("/locations").service(get_stream)),
        )
        .await;

        let req = TestRequest::get().uri("/locations/stream").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn admin_gets_event_stream() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(Broadcaster::memory()))
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert(Principal {
                        user_id: Uuid::new_v4(),
                        company_id: Some(Uuid::new_v4()),
                        role: Role::Admin,
                    });
                    srv.call(req)
                })
                .service(web::scope("/locations").service(get_stream)),
        )
        .await;

        let req = TestRequest::get().uri("/locations/stream").to_request();
        let resp = call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
    }
}

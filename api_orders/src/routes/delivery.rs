use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{enums::Role, error::Res, http::Success, principal::Principal};
use db::dtos::order::DeliveryFilter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::delivery::{CompleteDeliveryRequest, DeliveryQuery},
    services,
};

#[get("")]
async fn get_deliveries(
    principal: web::ReqData<Principal>,
    query: web::Query<DeliveryQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin, Role::Delivery])?;
    let deliveries = db::delivery::list_deliveries(
        &***pool,
        DeliveryFilter {
            company_id: principal.company_id()?,
            delivery_person_id: services::delivery::visible_person(
                &principal,
                query.delivery_person_id,
            ),
            status: query.status,
        },
    )
    .await?;
    Success::ok(deliveries)
}

#[post("/{id}/complete")]
async fn post_complete(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    req: web::Json<CompleteDeliveryRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin, Role::Delivery])?;
    let result =
        services::delivery::complete(&pool, &principal, path.into_inner(), req.into_inner())
            .await?;
    Success::ok(result)
}

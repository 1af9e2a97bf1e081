use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, caller};
use crate::application::Marketplace;
use crate::domain::filter::OrderFilter;
use crate::domain::order::{NewOrder, Order, OrderPatch, OrderStatus};
use crate::errors::AppError;

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub status: OrderStatus,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checkout. Open to anonymous customers; the order always starts as
/// `pending` whatever status the body carries.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = NewOrder,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid customer details or quantity"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    market: web::Data<Marketplace>,
    body: web::Json<NewOrder>,
) -> Result<HttpResponse, AppError> {
    let data = body.into_inner();
    let order = blocking(move || market.place_order(data)).await?;
    Ok(HttpResponse::Created().json(order))
}

/// GET /orders
///
/// A shop's orders for its vendor. Admins may leave out `shopId`.
#[utoipa::path(
    get,
    path = "/orders",
    params(OrderFilter, ("X-User-Id" = String, Header, description = "Calling user")),
    responses(
        (status = 200, description = "Matching orders, newest first", body = Vec<Order>),
        (status = 401, description = "No calling user"),
        (status = 403, description = "Caller does not manage the shop"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    query: web::Query<OrderFilter>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let filter = query.into_inner();

    let orders = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.list_orders(&actor, &filter)
    })
    .await?;

    Ok(HttpResponse::Ok().json(orders))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = String, Header, description = "Calling user"),
    ),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 401, description = "No calling user"),
        (status = 403, description = "Caller does not manage the shop"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let id = path.into_inner();

    let order = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.get_order(&actor, id)
    })
    .await?;

    Ok(HttpResponse::Ok().json(order))
}

/// PATCH /orders/{id}
///
/// Only the notes are editable; status moves through `/orders/{id}/status`.
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    request_body = OrderPatch,
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = String, Header, description = "Calling user"),
    ),
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 403, description = "Caller does not manage the shop"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
    body: web::Json<OrderPatch>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let id = path.into_inner();
    let patch = body.into_inner();

    let order = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.update_order(&actor, id, patch)
    })
    .await?;

    Ok(HttpResponse::Ok().json(order))
}

/// POST /orders/{id}/status
#[utoipa::path(
    post,
    path = "/orders/{id}/status",
    request_body = StatusChangeRequest,
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = String, Header, description = "Calling user"),
    ),
    responses(
        (status = 200, description = "Order in the requested status", body = Order),
        (status = 403, description = "Caller does not manage the shop"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed from the current status"),
    ),
    tag = "orders"
)]
pub async fn transition_order(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
    body: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let id = path.into_inner();
    let target = body.into_inner().status;

    let order = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.transition_order(&actor, id, target)
    })
    .await?;

    Ok(HttpResponse::Ok().json(order))
}

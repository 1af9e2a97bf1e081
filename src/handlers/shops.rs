use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use super::{blocking, caller};
use crate::application::Marketplace;
use crate::domain::errors::{DomainError, EntityKind};
use crate::domain::filter::ShopFilter;
use crate::domain::shop::{NewShop, Shop, ShopPatch};
use crate::domain::stats::{OrderStats, ProductStats};
use crate::errors::AppError;

/// POST /shops
///
/// Opens a shop for the calling user and makes them its vendor.
#[utoipa::path(
    post,
    path = "/shops",
    request_body = NewShop,
    params(("X-User-Id" = String, Header, description = "Calling user")),
    responses(
        (status = 201, description = "Shop opened", body = Shop),
        (status = 401, description = "No calling user"),
        (status = 422, description = "Invalid shop data, or the user cannot own a shop"),
    ),
    tag = "shops"
)]
pub async fn register_vendor(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    body: web::Json<NewShop>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let data = body.into_inner();

    let shop = blocking(move || market.profiles().register_vendor(&identity, data)).await?;

    Ok(HttpResponse::Created().json(shop))
}

/// GET /shops
#[utoipa::path(
    get,
    path = "/shops",
    params(ShopFilter),
    responses(
        (status = 200, description = "Matching shops, newest first", body = Vec<Shop>),
    ),
    tag = "shops"
)]
pub async fn list_shops(
    market: web::Data<Marketplace>,
    query: web::Query<ShopFilter>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner();
    let shops = blocking(move || market.queries().list_shops(&filter)).await?;
    Ok(HttpResponse::Ok().json(shops))
}

/// GET /shops/{id}
#[utoipa::path(
    get,
    path = "/shops/{id}",
    params(("id" = Uuid, Path, description = "Shop UUID")),
    responses(
        (status = 200, description = "Shop found", body = Shop),
        (status = 404, description = "Shop not found"),
    ),
    tag = "shops"
)]
pub async fn get_shop(
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let shop = blocking(move || {
        market
            .entities()
            .get_shop_by_id(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Shop, id))
    })
    .await?;
    Ok(HttpResponse::Ok().json(shop))
}

/// PATCH /shops/{id}
///
/// Verification, featuring, rating and status are platform fields and
/// need an admin caller.
#[utoipa::path(
    patch,
    path = "/shops/{id}",
    request_body = ShopPatch,
    params(
        ("id" = Uuid, Path, description = "Shop UUID"),
        ("X-User-Id" = String, Header, description = "Calling user"),
    ),
    responses(
        (status = 200, description = "Shop updated", body = Shop),
        (status = 403, description = "Caller does not manage this shop"),
        (status = 404, description = "Shop not found"),
        (status = 422, description = "Invalid shop data"),
    ),
    tag = "shops"
)]
pub async fn update_shop(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
    body: web::Json<ShopPatch>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let id = path.into_inner();
    let patch = body.into_inner();

    let shop = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.update_shop(&actor, id, patch)
    })
    .await?;

    Ok(HttpResponse::Ok().json(shop))
}

/// GET /shops/{id}/order-stats
#[utoipa::path(
    get,
    path = "/shops/{id}/order-stats",
    params(
        ("id" = Uuid, Path, description = "Shop UUID"),
        ("X-User-Id" = String, Header, description = "Calling user"),
    ),
    responses(
        (status = 200, description = "Order counts and revenue", body = OrderStats),
        (status = 401, description = "No calling user"),
        (status = 403, description = "Caller does not manage the shop"),
        (status = 404, description = "Shop not found"),
    ),
    tag = "shops"
)]
pub async fn order_stats(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let id = path.into_inner();

    let stats = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.order_stats(&actor, id)
    })
    .await?;

    Ok(HttpResponse::Ok().json(stats))
}

/// GET /shops/{id}/product-stats
#[utoipa::path(
    get,
    path = "/shops/{id}/product-stats",
    params(
        ("id" = Uuid, Path, description = "Shop UUID"),
        ("X-User-Id" = String, Header, description = "Calling user"),
    ),
    responses(
        (status = 200, description = "Catalog figures", body = ProductStats),
        (status = 401, description = "No calling user"),
        (status = 403, description = "Caller does not manage the shop"),
        (status = 404, description = "Shop not found"),
    ),
    tag = "shops"
)]
pub async fn product_stats(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let id = path.into_inner();

    let stats = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.product_stats(&actor, id)
    })
    .await?;

    Ok(HttpResponse::Ok().json(stats))
}

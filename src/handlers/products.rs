use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::{blocking, caller};
use crate::application::Marketplace;
use crate::domain::errors::{DomainError, EntityKind};
use crate::domain::filter::ProductFilter;
use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::errors::AppError;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RelatedParams {
    /// How many products to return. Defaults to 4.
    pub limit: Option<usize>,
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = NewProduct,
    params(("X-User-Id" = String, Header, description = "Calling user")),
    responses(
        (status = 201, description = "Product listed", body = Product),
        (status = 403, description = "Caller does not manage the shop"),
        (status = 404, description = "Shop not found"),
        (status = 422, description = "Invalid product data"),
    ),
    tag = "products"
)]
pub async fn create_product(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    body: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let data = body.into_inner();

    let product = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.create_product(&actor, data)
    })
    .await?;

    Ok(HttpResponse::Created().json(product))
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    params(ProductFilter),
    responses(
        (status = 200, description = "Matching products, newest first", body = Vec<Product>),
    ),
    tag = "products"
)]
pub async fn list_products(
    market: web::Data<Marketplace>,
    query: web::Query<ProductFilter>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner();
    let products = blocking(move || market.queries().list_products(&filter)).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /products/{id}
///
/// Product detail page. Each successful read counts one view.
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = blocking(move || {
        market
            .entities()
            .view_product(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Product, id))
    })
    .await?;
    Ok(HttpResponse::Ok().json(product))
}

/// GET /products/{id}/related
#[utoipa::path(
    get,
    path = "/products/{id}/related",
    params(("id" = Uuid, Path, description = "Product UUID"), RelatedParams),
    responses(
        (status = 200, description = "Other available products of the same shop", body = Vec<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn related_products(
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
    query: web::Query<RelatedParams>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let limit = query.into_inner().limit;

    let related = blocking(move || {
        let product = market
            .entities()
            .get_product_by_id(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Product, id))?;
        market
            .queries()
            .related_products(product.shop_id, product.id, limit)
    })
    .await?;

    Ok(HttpResponse::Ok().json(related))
}

/// PATCH /products/{id}
#[utoipa::path(
    patch,
    path = "/products/{id}",
    request_body = ProductPatch,
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
        ("X-User-Id" = String, Header, description = "Calling user"),
    ),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 403, description = "Caller does not manage the shop"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid product data"),
    ),
    tag = "products"
)]
pub async fn update_product(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
    body: web::Json<ProductPatch>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let id = path.into_inner();
    let patch = body.into_inner();

    let product = blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.update_product(&actor, id, patch)
    })
    .await?;

    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
        ("X-User-Id" = String, Header, description = "Calling user"),
    ),
    responses(
        (status = 204, description = "Product removed"),
        (status = 403, description = "Caller does not manage the shop"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    req: HttpRequest,
    market: web::Data<Marketplace>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let id = path.into_inner();

    blocking(move || {
        let actor = market.profiles().ensure_profile(&identity)?;
        market.delete_product(&actor, id)
    })
    .await?;

    Ok(HttpResponse::NoContent().finish())
}

use actix_web::{web, HttpRequest, HttpResponse};

use super::{blocking, caller};
use crate::application::Marketplace;
use crate::errors::AppError;

/// GET /me
///
/// The caller's profile, created as a customer on first sign-in.
#[utoipa::path(
    get,
    path = "/me",
    params(("X-User-Id" = String, Header, description = "Calling user")),
    responses(
        (status = 200, description = "Caller profile with role and shop binding"),
        (status = 401, description = "No calling user"),
    ),
    tag = "profiles"
)]
pub async fn me(req: HttpRequest, market: web::Data<Marketplace>) -> Result<HttpResponse, AppError> {
    let identity = caller(&req)?;
    let profile = blocking(move || market.profiles().ensure_profile(&identity)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

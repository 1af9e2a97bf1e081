pub mod orders;
pub mod products;
pub mod profiles;
pub mod shops;
pub mod stories;

use actix_web::{web, HttpRequest};

use crate::domain::errors::DomainError;
use crate::domain::user::Identity;
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_EMAIL_HEADER: &str = "X-User-Email";
pub const USER_NAME_HEADER: &str = "X-User-Name";

/// The signed-in user as forwarded by the gateway.
pub(crate) fn caller(req: &HttpRequest) -> Result<Identity, AppError> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let user_id = header(USER_ID_HEADER).ok_or(AppError::Unauthorized)?;
    Ok(Identity {
        email: header(USER_EMAIL_HEADER).unwrap_or_default(),
        display_name: header(USER_NAME_HEADER),
        user_id,
    })
}

/// Runs store work on the blocking thread pool.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(work).await??)
}

//! Catalog consistency rules, run by the entity store around every product
//! write so that callers cannot skip them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::Store;
use crate::domain::product::Product;

pub(crate) fn product_created(
    repo: &dyn Store,
    product: &Product,
    at: DateTime<Utc>,
) -> Result<(), DomainError> {
    bump_products_count(repo, product.shop_id, 1, at)
}

pub(crate) fn product_deleted(
    repo: &dyn Store,
    product: &Product,
    at: DateTime<Utc>,
) -> Result<(), DomainError> {
    bump_products_count(repo, product.shop_id, -1, at)
}

fn bump_products_count(
    repo: &dyn Store,
    shop_id: Uuid,
    delta: i32,
    at: DateTime<Utc>,
) -> Result<(), DomainError> {
    match repo.adjust_products_count(shop_id, delta, at) {
        Ok(true) => Ok(()),
        Ok(false) => {
            log::warn!("shop {shop_id} vanished before its product count could change by {delta}");
            Ok(())
        }
        Err(e) => {
            log::warn!("product count for shop {shop_id} is stale by {delta}: {e}");
            Err(e)
        }
    }
}

/// Stock is the single source of truth for availability, whatever the
/// caller asked for.
pub(crate) fn before_product_saved(product: &mut Product) {
    let requested = product.is_available;
    product.derive_availability();
    if requested != product.is_available {
        log::debug!(
            "product {} availability forced to {} by stock {}",
            product.id,
            product.is_available,
            product.stock
        );
    }
}

/// Counts a detail view without holding up the read: on the blocking pool
/// when a Tokio runtime is around, inline otherwise. Failures are logged and
/// never reach the reader.
pub(crate) fn product_viewed(repo: Arc<dyn Store>, id: Uuid) {
    let count = move || {
        if let Err(e) = repo.increment_views(id) {
            log::warn!("could not count view of product {id}: {e}");
        }
    };
    match Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn_blocking(count);
        }
        Err(_) => count(),
    }
}

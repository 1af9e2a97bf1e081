mod catalog;
pub mod entity_store;
pub mod lifecycle;
pub mod live;
pub mod profiles;
pub mod queries;

use std::sync::Arc;

use uuid::Uuid;

pub use entity_store::EntityStore;
pub use lifecycle::OrderLifecycle;
pub use live::{ChangeFeed, Subscription};
pub use profiles::ProfileService;
pub use queries::QueryService;

use crate::domain::errors::DomainError;
use crate::domain::filter::OrderFilter;
use crate::domain::order::{NewOrder, Order, OrderPatch, OrderStatus};
use crate::domain::ports::Store;
use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::domain::shop::{Shop, ShopPatch};
use crate::domain::stats::{OrderStats, ProductStats};
use crate::domain::user::UserProfile;

/// The marketplace core, wired over one store.
///
/// Catalog reads and checkout are open to anyone. Order data, shop
/// dashboards and vendor-side writes take the acting profile and are refused
/// unless it manages the shop involved.
#[derive(Clone)]
pub struct Marketplace {
    entities: EntityStore,
    lifecycle: OrderLifecycle,
    queries: QueryService,
    profiles: ProfileService,
}

impl Marketplace {
    pub fn new(repo: Arc<dyn Store>) -> Self {
        let entities = EntityStore::new(repo, ChangeFeed::new());
        Self {
            lifecycle: OrderLifecycle::new(entities.clone()),
            queries: QueryService::new(entities.clone()),
            profiles: ProfileService::new(entities.clone()),
            entities,
        }
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    pub fn lifecycle(&self) -> &OrderLifecycle {
        &self.lifecycle
    }

    pub fn update_shop(
        &self,
        actor: &UserProfile,
        id: Uuid,
        patch: ShopPatch,
    ) -> Result<Shop, DomainError> {
        actor.ensure_can_manage(id, "edit this shop")?;
        if patch.touches_platform_fields() && !actor.is_admin() {
            return Err(DomainError::Forbidden {
                action: "change verification, featuring, rating or status",
            });
        }
        self.entities.update_shop(id, patch)
    }

    pub fn create_product(
        &self,
        actor: &UserProfile,
        data: NewProduct,
    ) -> Result<Product, DomainError> {
        actor.ensure_can_manage(data.shop_id, "add products")?;
        self.entities.create_product(data)
    }

    pub fn update_product(
        &self,
        actor: &UserProfile,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Product, DomainError> {
        let product = self.entities.require_product(id)?;
        actor.ensure_can_manage(product.shop_id, "edit products")?;
        self.entities.update_product(id, patch)
    }

    pub fn delete_product(&self, actor: &UserProfile, id: Uuid) -> Result<Product, DomainError> {
        let product = self.entities.require_product(id)?;
        actor.ensure_can_manage(product.shop_id, "delete products")?;
        self.entities.delete_product(id)
    }

    pub fn place_order(&self, data: NewOrder) -> Result<Order, DomainError> {
        self.entities.create_order(data)
    }

    pub fn update_order(
        &self,
        actor: &UserProfile,
        id: Uuid,
        patch: OrderPatch,
    ) -> Result<Order, DomainError> {
        let order = self.entities.require_order(id)?;
        actor.ensure_can_manage(order.shop_id, "edit orders")?;
        self.entities.update_order(id, patch)
    }

    pub fn transition_order(
        &self,
        actor: &UserProfile,
        id: Uuid,
        target: OrderStatus,
    ) -> Result<Order, DomainError> {
        self.lifecycle.transition_order(actor, id, target)
    }

    pub fn get_order(&self, actor: &UserProfile, id: Uuid) -> Result<Order, DomainError> {
        let order = self.entities.require_order(id)?;
        actor.ensure_can_manage(order.shop_id, "view this order")?;
        Ok(order)
    }

    /// A shop's orders. Only admins may list without naming a shop.
    pub fn list_orders(
        &self,
        actor: &UserProfile,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, DomainError> {
        match filter.shop_id {
            Some(shop_id) => actor.ensure_can_manage(shop_id, "view this shop's orders")?,
            None if actor.is_admin() => {}
            None => {
                return Err(DomainError::Forbidden {
                    action: "list orders across shops",
                })
            }
        }
        self.queries.list_orders(filter)
    }

    pub fn order_stats(
        &self,
        actor: &UserProfile,
        shop_id: Uuid,
    ) -> Result<OrderStats, DomainError> {
        actor.ensure_can_manage(shop_id, "view this shop's dashboard")?;
        self.queries.get_order_stats(shop_id)
    }

    pub fn product_stats(
        &self,
        actor: &UserProfile,
        shop_id: Uuid,
    ) -> Result<ProductStats, DomainError> {
        actor.ensure_can_manage(shop_id, "view this shop's dashboard")?;
        self.queries.get_product_stats(shop_id)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use crate::domain::errors::DomainError;
    use crate::domain::filter::OrderFilter;
    use crate::domain::product::ProductPatch;
    use crate::domain::shop::ShopPatch;

    #[test]
    fn vendor_edits_own_shop_profile() {
        let fx = Fixture::new();
        let shop = fx
            .market
            .update_shop(
                &fx.vendor,
                fx.shop.id,
                ShopPatch {
                    description: Some("Phulkari dupattas".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(shop.description, "Phulkari dupattas");
        assert!(shop.updated_at >= fx.shop.updated_at);
    }

    #[test]
    fn only_admins_verify_or_feature_shops() {
        let fx = Fixture::new();
        let feature = || ShopPatch {
            is_featured: Some(true),
            is_verified: Some(true),
            ..Default::default()
        };

        let err = fx
            .market
            .update_shop(&fx.vendor, fx.shop.id, feature())
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        let shop = fx.market.update_shop(&fx.admin(), fx.shop.id, feature()).unwrap();
        assert!(shop.is_featured && shop.is_verified);
    }

    #[test]
    fn customers_cannot_touch_the_catalog() {
        let fx = Fixture::new();
        let product = fx.add_product("Kurta", "Kurtas", 2, 1000);
        let shopper = fx.customer("shopper-1");

        let err = fx
            .market
            .update_product(
                &shopper,
                product.id,
                ProductPatch {
                    price: Some(1),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));
        assert!(matches!(
            fx.market.delete_product(&shopper, product.id),
            Err(DomainError::Forbidden { .. })
        ));
        assert_eq!(fx.product_now(product.id).price, 1000);
    }

    #[test]
    fn another_vendor_cannot_move_foreign_orders() {
        let fx = Fixture::new();
        let product = fx.add_product("Kurta", "Kurtas", 2, 1000);
        let order = fx.place(&product, 1);

        let rival_id = super::testing::identity("vendor-2");
        fx.market
            .profiles()
            .register_vendor(
                &rival_id,
                crate::domain::shop::tests::new_shop("Rival", "Karachi", "Clothing"),
            )
            .unwrap();
        let rival = fx.market.profiles().ensure_profile(&rival_id).unwrap();

        let err = fx
            .market
            .transition_order(&rival, order.id, crate::domain::order::OrderStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));
    }

    #[test]
    fn order_data_is_for_the_shop_and_admins_only() {
        let fx = Fixture::new();
        let product = fx.add_product("Kurta", "Kurtas", 2, 1000);
        let order = fx.place(&product, 1);
        let shopper = fx.customer("shopper-1");
        let forbidden = |result: Result<_, DomainError>| {
            matches!(result, Err(DomainError::Forbidden { .. }))
        };

        assert!(forbidden(fx.market.get_order(&shopper, order.id).map(|_| ())));
        assert!(forbidden(
            fx.market
                .list_orders(&shopper, &OrderFilter::for_shop(fx.shop.id))
                .map(|_| ())
        ));
        assert!(forbidden(fx.market.order_stats(&shopper, fx.shop.id).map(|_| ())));
        assert!(forbidden(fx.market.product_stats(&shopper, fx.shop.id).map(|_| ())));

        assert_eq!(fx.market.get_order(&fx.vendor, order.id).unwrap().id, order.id);
        let own = fx
            .market
            .list_orders(&fx.vendor, &OrderFilter::for_shop(fx.shop.id))
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(fx.market.order_stats(&fx.vendor, fx.shop.id).unwrap().total, 1);
    }

    #[test]
    fn only_admins_list_orders_across_shops() {
        let fx = Fixture::new();
        let product = fx.add_product("Kurta", "Kurtas", 2, 1000);
        fx.place(&product, 1);

        assert!(matches!(
            fx.market.list_orders(&fx.vendor, &OrderFilter::default()),
            Err(DomainError::Forbidden { .. })
        ));
        let all = fx.market.list_orders(&fx.admin(), &OrderFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
    }
}

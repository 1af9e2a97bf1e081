use chrono::Utc;
use uuid::Uuid;

use super::entity_store::EntityStore;
use crate::domain::errors::{DomainError, EntityKind};
use crate::domain::order::{Order, OrderStatus, OrderTransition};
use crate::domain::user::UserProfile;

/// Drives orders through their status state machine.
#[derive(Clone)]
pub struct OrderLifecycle {
    entities: EntityStore,
}

impl OrderLifecycle {
    pub fn new(entities: EntityStore) -> Self {
        Self { entities }
    }

    /// Moves an order to `target` on behalf of `actor`, who must manage the
    /// order's shop.
    ///
    /// Asking for the status the order already has succeeds without touching
    /// anything, so a repeated `delivered` never counts the sale twice.
    /// Writes are not retried here; a failed commit leaves the order as it was.
    pub fn transition_order(
        &self,
        actor: &UserProfile,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<Order, DomainError> {
        let order = self.entities.require_order(order_id)?;
        actor.ensure_can_manage(order.shop_id, "change order status")?;

        if order.status == target {
            return Ok(order);
        }

        let transition = OrderTransition::plan(&order, target, Utc::now()).map_err(|e| {
            log::debug!("order {order_id}: rejected {} -> {target}", order.status);
            e
        })?;

        match self.entities.commit_transition(&transition)? {
            Some(updated) => {
                log::info!(
                    "order {order_id} moved {} -> {} by {}",
                    transition.from,
                    transition.to,
                    actor.uid
                );
                Ok(updated)
            }
            None => self.resolve_lost_race(order_id, target),
        }
    }

    /// Another writer changed the order between our read and our commit.
    fn resolve_lost_race(&self, order_id: Uuid, target: OrderStatus) -> Result<Order, DomainError> {
        let current = self
            .entities
            .get_order_by_id(order_id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Order, order_id))?;
        if current.status == target {
            return Ok(current);
        }
        log::warn!(
            "order {order_id} changed to {} while moving to {target}",
            current.status
        );
        Err(DomainError::InvalidTransition {
            from: current.status,
            to: target,
        })
    }
}

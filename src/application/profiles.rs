use chrono::Utc;

use super::entity_store::EntityStore;
use crate::domain::errors::DomainError;
use crate::domain::shop::{NewShop, Shop};
use crate::domain::user::{Identity, Role, UserProfile};

#[derive(Clone)]
pub struct ProfileService {
    entities: EntityStore,
}

impl ProfileService {
    pub fn new(entities: EntityStore) -> Self {
        Self { entities }
    }

    /// Returns the user's profile, creating a customer profile on first
    /// sign-in.
    pub fn ensure_profile(&self, identity: &Identity) -> Result<UserProfile, DomainError> {
        if let Some(profile) = self.entities.get_profile(&identity.user_id)? {
            return Ok(profile);
        }
        let profile = UserProfile::first_sign_in(identity, Utc::now());
        if self.entities.insert_profile(&profile)? {
            log::info!("created profile for user {}", profile.uid);
            return Ok(profile);
        }
        // Someone else created it first.
        self.entities
            .get_profile(&identity.user_id)?
            .ok_or_else(|| DomainError::TransientIo(format!("profile {} vanished", identity.user_id)))
    }

    /// Opens a shop for a signed-in customer and makes them its vendor.
    pub fn register_vendor(&self, identity: &Identity, data: NewShop) -> Result<Shop, DomainError> {
        let mut profile = self.ensure_profile(identity)?;
        match profile.role {
            Role::Customer => {}
            Role::Vendor { .. } => {
                return Err(DomainError::validation("role", "user already owns a shop"))
            }
            Role::Admin => return Err(DomainError::validation("role", "admins cannot own a shop")),
        }

        // A shop without a vendor profile is left over from an interrupted
        // registration; bind to it instead of opening a second one.
        let shop = match self.entities.get_shop_by_owner(&profile.uid)? {
            Some(existing) => existing,
            None => self.entities.create_shop(&profile.uid, data)?,
        };
        profile.role = Role::Vendor { shop_id: shop.id };
        self.entities.save_profile(&profile)?;
        log::info!("user {} is now vendor of shop {}", profile.uid, shop.id);
        Ok(shop)
    }
}

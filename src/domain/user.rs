use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// What a user may do. A vendor is always bound to exactly one shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
    Vendor {
        #[serde(rename = "shopId")]
        shop_id: Uuid,
    },
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::Vendor { .. } => "vendor",
        }
    }

    pub fn shop_id(self) -> Option<Uuid> {
        match self {
            Role::Vendor { shop_id } => Some(shop_id),
            Role::Customer | Role::Admin => None,
        }
    }

    /// Rebuilds a role from its stored `(role, shop_id)` pair.
    pub fn from_parts(role: &str, shop_id: Option<Uuid>) -> Result<Self, DomainError> {
        match (role, shop_id) {
            ("customer", _) => Ok(Role::Customer),
            ("admin", _) => Ok(Role::Admin),
            ("vendor", Some(shop_id)) => Ok(Role::Vendor { shop_id }),
            ("vendor", None) => Err(DomainError::validation("shopId", "vendor profile without a shop")),
            (other, _) => Err(DomainError::validation("role", format!("unknown role '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn first_sign_in(identity: &Identity, now: DateTime<Utc>) -> Self {
        UserProfile {
            uid: identity.user_id.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            role: Role::Customer,
            created_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Vendors manage their own shop; admins manage every shop.
    pub fn can_manage(&self, shop_id: Uuid) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Vendor { shop_id: own } => own == shop_id,
            Role::Customer => false,
        }
    }

    pub fn ensure_can_manage(&self, shop_id: Uuid, action: &'static str) -> Result<(), DomainError> {
        if self.can_manage(shop_id) {
            Ok(())
        } else {
            log::debug!("user {} may not {action} for shop {shop_id}", self.uid);
            Err(DomainError::Forbidden { action })
        }
    }
}

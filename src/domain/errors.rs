use std::fmt;

use thiserror::Error;

use super::order::OrderStatus;

/// The collection an id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Shop,
    Product,
    Order,
    Story,
    UserProfile,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Shop => "Shop",
            EntityKind::Product => "Product",
            EntityKind::Order => "Order",
            EntityKind::Story => "Story",
            EntityKind::UserProfile => "User profile",
        })
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Not permitted to {action}")]
    Forbidden { action: &'static str },
    #[error("Storage unavailable: {0}")]
    TransientIo(String),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Only infrastructure failures are worth retrying, and only for reads.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::TransientIo(_))
    }
}

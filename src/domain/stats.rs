//! Dashboard figures, always derived from the full current result set.

use serde::Serialize;
use utoipa::ToSchema;

use super::order::{Order, OrderStatus};
use super::product::Product;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    /// Confirmed or shipped.
    pub in_progress: usize,
    pub delivered: usize,
    pub cancelled: usize,
    /// Sum of amounts over every order that is not cancelled.
    pub revenue: i64,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(OrderStats::default(), |mut stats, order| {
            stats.total += 1;
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Confirmed | OrderStatus::Shipped => stats.in_progress += 1,
                OrderStatus::Delivered => stats.delivered += 1,
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
            if order.status != OrderStatus::Cancelled {
                stats.revenue += order.amount;
            }
            stats
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total: usize,
    pub available: usize,
    pub low_stock: usize,
    /// Sum of each product's delivered-order counter.
    pub total_orders: i64,
}

impl ProductStats {
    pub fn from_products(products: &[Product]) -> Self {
        ProductStats {
            total: products.len(),
            available: products.iter().filter(|p| p.is_available).count(),
            low_stock: products.iter().filter(|p| p.is_low_stock()).count(),
            total_orders: products.iter().map(|p| i64::from(p.orders)).sum(),
        }
    }
}

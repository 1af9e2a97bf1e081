use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::product::Product;
use super::validation::{self, required};

/// Where an order is in its fulfilment.
///
/// Forward progress is `Pending -> Confirmed -> Shipped -> Delivered`, one
/// step at a time. Any non-terminal state may be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether `self -> next` is a legal single step. Staying put is not a
    /// transition and returns false.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Shipped)
                | (Shipped, Delivered)
                | (Pending | Confirmed | Shipped, Cancelled)
        )
    }

    /// Goods are still on the shop's shelf in these states, so cancelling
    /// hands the quantity back to stock.
    pub fn holds_stock(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation("status", format!("unknown order status '{s}'")))
    }
}

/// Contact block captured at checkout. Free-form, not a separate entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
}

impl Customer {
    pub fn validate(&self) -> Result<(), DomainError> {
        required("customer.name", &self.name)?;
        validation::phone("customer.phone", &self.phone)?;
        required("customer.address", &self.address)?;
        required("customer.city", &self.city)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Product name at checkout. Not updated if the product is renamed.
    pub product_name: String,
    /// Product image at checkout. Not updated if the product changes.
    pub product_image: String,
    pub shop_id: Uuid,
    pub customer: Customer,
    pub quantity: i32,
    /// `quantity * price` at checkout; never recomputed.
    pub amount: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Checkout request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub product_id: Uuid,
    pub customer: Customer,
    pub quantity: i32,
    #[serde(default)]
    pub notes: Option<String>,
    /// Ignored: every order starts out `pending`.
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl NewOrder {
    /// Builds the order against the product as it is right now, fixing the
    /// amount at the current price.
    pub fn into_order(self, product: &Product, now: DateTime<Utc>) -> Result<Order, DomainError> {
        self.customer.validate()?;
        if self.quantity < 1 {
            return Err(DomainError::validation("quantity", "must be at least 1"));
        }
        if self.quantity > product.stock {
            return Err(DomainError::validation(
                "quantity",
                format!("only {} in stock", product.stock),
            ));
        }
        let amount = product
            .price
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| DomainError::validation("quantity", "order amount overflows"))?;

        Ok(Order {
            id: Uuid::new_v4(),
            product_id: product.id,
            product_name: product.name.clone(),
            product_image: product.image.clone(),
            shop_id: product.shop_id,
            customer: self.customer,
            quantity: self.quantity,
            amount,
            status: OrderStatus::Pending,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Fields a vendor may edit directly. Status goes through the lifecycle and
/// the amount is fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub notes: Option<String>,
}

impl OrderPatch {
    pub fn apply(self, order: &mut Order) {
        if let Some(notes) = self.notes {
            order.notes = Some(notes);
        }
    }
}

/// Stock handed back to a product when an order is cancelled before shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRestore {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Counters bumped once when an order is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedSale {
    pub shop_id: Uuid,
    pub product_id: Uuid,
}

/// A status change together with the aggregate updates it implies. Stores
/// commit the whole plan or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTransition {
    pub order_id: Uuid,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
    pub completed_sale: Option<CompletedSale>,
    pub restore_stock: Option<StockRestore>,
}

impl OrderTransition {
    pub fn plan(order: &Order, to: OrderStatus, at: DateTime<Utc>) -> Result<Self, DomainError> {
        let from = order.status;
        if !from.can_transition_to(to) {
            return Err(DomainError::InvalidTransition { from, to });
        }

        let completed_sale = (to == OrderStatus::Delivered).then_some(CompletedSale {
            shop_id: order.shop_id,
            product_id: order.product_id,
        });
        // Cancelling after shipping keeps stock as is: the goods have left.
        let restore_stock = (to == OrderStatus::Cancelled && from.holds_stock()).then_some(StockRestore {
            product_id: order.product_id,
            quantity: order.quantity,
        });

        Ok(OrderTransition {
            order_id: order.id,
            from,
            to,
            at,
            completed_sale,
            restore_stock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::tests::sample_product;

    fn sample_order(status: OrderStatus) -> Order {
        let product = sample_product(10, 500);
        let mut order = NewOrder {
            product_id: product.id,
            customer: Customer {
                name: "Ayesha".to_string(),
                phone: "+923001234567".to_string(),
                address: "House 12, Street 4".to_string(),
                city: "Lahore".to_string(),
            },
            quantity: 3,
            notes: None,
            status: None,
        }
        .into_order(&product, Utc::now())
        .expect("valid order");
        order.status = status;
        order
    }

    #[test]
    fn forward_steps_are_allowed_one_at_a_time() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn backward_steps_are_rejected() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn terminal_states_go_nowhere() {
        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn new_orders_are_pending_with_amount_fixed() {
        let product = sample_product(5, 1000);
        let order = NewOrder {
            product_id: product.id,
            customer: Customer {
                name: "Bilal".to_string(),
                phone: "0300".to_string(),
                address: "Mall Road".to_string(),
                city: "Murree".to_string(),
            },
            quantity: 2,
            notes: None,
            status: Some(OrderStatus::Delivered),
        }
        .into_order(&product, Utc::now())
        .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.amount, 2000);
        assert_eq!(order.shop_id, product.shop_id);
    }

    #[test]
    fn quantity_beyond_stock_is_rejected() {
        let product = sample_product(1, 1000);
        let err = NewOrder {
            product_id: product.id,
            customer: sample_order(OrderStatus::Pending).customer,
            quantity: 2,
            notes: None,
            status: None,
        }
        .into_order(&product, Utc::now())
        .unwrap_err();

        assert!(matches!(err, DomainError::Validation { field: "quantity", .. }));
    }

    #[test]
    fn overlong_customer_phone_is_a_validation_error() {
        let product = sample_product(3, 1000);
        let mut customer = sample_order(OrderStatus::Pending).customer;
        customer.phone = "+92".repeat(20);
        let err = NewOrder {
            product_id: product.id,
            customer,
            quantity: 1,
            notes: None,
            status: None,
        }
        .into_order(&product, Utc::now())
        .unwrap_err();

        assert!(!err.is_retryable());
        assert!(matches!(err, DomainError::Validation { field: "customer.phone", .. }));
    }

    #[test]
    fn delivery_plans_a_completed_sale() {
        let order = sample_order(OrderStatus::Shipped);
        let plan = OrderTransition::plan(&order, OrderStatus::Delivered, Utc::now()).unwrap();
        assert!(plan.completed_sale.is_some());
        assert!(plan.restore_stock.is_none());
    }

    #[test]
    fn cancelling_before_shipping_restores_stock() {
        for from in [OrderStatus::Pending, OrderStatus::Confirmed] {
            let order = sample_order(from);
            let plan = OrderTransition::plan(&order, OrderStatus::Cancelled, Utc::now()).unwrap();
            assert_eq!(
                plan.restore_stock,
                Some(StockRestore {
                    product_id: order.product_id,
                    quantity: 3
                })
            );
        }
    }

    #[test]
    fn cancelling_after_shipping_keeps_stock() {
        let order = sample_order(OrderStatus::Shipped);
        let plan = OrderTransition::plan(&order, OrderStatus::Cancelled, Utc::now()).unwrap();
        assert!(plan.restore_stock.is_none());
        assert!(plan.completed_sale.is_none());
    }

    #[test]
    fn skipping_states_fails_to_plan() {
        let order = sample_order(OrderStatus::Pending);
        let err = OrderTransition::plan(&order, OrderStatus::Delivered, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered
            }
        ));
    }
}

pub mod errors;
pub mod filter;
pub mod order;
pub mod ports;
pub mod product;
pub mod shop;
pub mod stats;
pub mod story;
pub mod user;
pub(crate) mod validation;

pub use errors::{DomainError, EntityKind};
pub use filter::{OrderFilter, ProductFilter, ShopFilter};
pub use order::{Customer, NewOrder, Order, OrderPatch, OrderStatus};
pub use product::{NewProduct, Product, ProductPatch};
pub use shop::{NewShop, Shop, ShopPatch, ShopStatus};
pub use stats::{OrderStats, ProductStats};
pub use story::Story;
pub use user::{Identity, Role, UserProfile};

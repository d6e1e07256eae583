// core/src/models/mod.rs

//! Wire and domain types shared by the API client and the view-models.

pub mod identity;
pub mod order;
pub mod requests;

pub use identity::{Identity, Role};
pub use order::{Order, OrderStatus, OrderStatusSnapshot};
pub use requests::{CheckoutLink, CreateOrderRequest, Credentials, SignupRequest, TenantSettings, TokenResponse};

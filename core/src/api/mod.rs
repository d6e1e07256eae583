// core/src/api/mod.rs

//! The remote ChatPayKit REST API as seen by the console.

pub mod http;

use crate::error::PayKitError;
use crate::models::{
  CheckoutLink, CreateOrderRequest, Credentials, Order, OrderStatusSnapshot, SignupRequest, TenantSettings,
  TokenResponse,
};
use async_trait::async_trait;

pub use http::HttpApiClient;

/// Every endpoint the console consumes.
///
/// Implementations attach the session credential themselves; callers never
/// deal with auth headers.
#[async_trait]
pub trait OrdersApi: Send + Sync {
  async fn signup(&self, request: &SignupRequest) -> Result<TokenResponse, PayKitError>;

  async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, PayKitError>;

  /// `GET /api/orders`. A body that is not a JSON array is a
  /// [`PayKitError::MalformedPayload`].
  async fn list_orders(&self) -> Result<Vec<Order>, PayKitError>;

  async fn get_order(&self, order_id: &str) -> Result<Order, PayKitError>;

  /// `GET /api/orders/{id}/sync`: the gateway's current view of one order.
  async fn sync_order(&self, order_id: &str) -> Result<Order, PayKitError>;

  async fn order_status(&self, order_id: &str) -> Result<OrderStatusSnapshot, PayKitError>;

  async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, PayKitError>;

  // The three state-transition endpoints answer with an order, but the console
  // only needs to know they succeeded; a body that does not decode is `None`.
  async fn send_payment(&self, order_id: &str) -> Result<Option<Order>, PayKitError>;

  async fn retry_payment(&self, order_id: &str) -> Result<Option<Order>, PayKitError>;

  async fn refund(&self, order_id: &str) -> Result<Option<Order>, PayKitError>;

  async fn checkout_link(&self, order_id: &str) -> Result<CheckoutLink, PayKitError>;

  /// `POST /api/admin/settings`. `bearer` replaces the session token for this
  /// request when given.
  async fn save_settings(&self, settings: &TenantSettings, bearer: Option<&str>) -> Result<(), PayKitError>;
}

// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chatpaykit::models::{
  CheckoutLink, CreateOrderRequest, Credentials, Order, OrderStatus, OrderStatusSnapshot, SignupRequest,
  TenantSettings, TokenResponse,
};
use chatpaykit::{CheckoutOpener, MemoryStore, OrdersApi, PayKitError, TokenStore};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Level;
use url::Url;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---
pub fn order(id: &str, status: OrderStatus) -> Order {
  Order {
    id: id.to_string(),
    customer_name: Some(format!("Customer {id}")),
    customer_whatsapp: Some("919876543210".to_string()),
    amount_paise: Some(50000),
    currency: Some("INR".to_string()),
    status: Some(status),
    ..Default::default()
  }
}

pub fn with_gateway_order(mut order: Order) -> Order {
  order.razorpay_order_id = Some(format!("order_{}", order.id));
  order
}

/// Unsigned JWT-shaped token carrying `claims`.
pub fn make_token(claims: serde_json::Value) -> String {
  let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
  let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
  format!("{header}.{payload}.signature")
}

pub fn admin_token() -> String {
  make_token(serde_json::json!({"userId": "u-1", "tenantId": "t-1", "role": "ADMIN"}))
}

pub fn memory_tokens(token: Option<&str>) -> TokenStore {
  let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
  if let Some(token) = token {
    tokens.set_token(token).unwrap();
  }
  tokens
}

// --- Scripted API ---

/// Failure to script for one operation. `PayKitError` is not `Clone`, so the
/// fake keeps this and converts on every call.
#[derive(Debug, Clone)]
pub enum Failure {
  Server(u16, Option<&'static str>),
  Transport(&'static str),
  Malformed(&'static str),
}

impl Failure {
  fn to_error(&self) -> PayKitError {
    match self {
      Failure::Server(status, message) => PayKitError::Server {
        status: *status,
        message: message.map(str::to_string),
      },
      Failure::Transport(message) => PayKitError::Transport {
        message: message.to_string(),
      },
      Failure::Malformed(message) => PayKitError::MalformedPayload(message.to_string()),
    }
  }
}

/// In-memory stand-in for the REST API.
///
/// Every call is logged as `op` or `op:id`. `send-payment` behaves like the
/// server: the order moves to PAYMENT_SENT and gains a gateway order id.
#[derive(Default)]
pub struct FakeApi {
  pub orders: Mutex<Vec<Order>>,
  pub sync_updates: Mutex<HashMap<String, Order>>,
  pub checkout_url: Mutex<Option<String>>,
  pub token: Mutex<Option<String>>,
  pub failures: Mutex<HashMap<&'static str, Failure>>,
  pub calls: Mutex<Vec<String>>,
  pub created: Mutex<Vec<CreateOrderRequest>>,
  pub settings_bearers: Mutex<Vec<Option<String>>>,
}

impl FakeApi {
  pub fn with_orders(orders: Vec<Order>) -> Arc<Self> {
    let api = Self::default();
    *api.orders.lock() = orders;
    *api.checkout_url.lock() = Some("https://pay.example.com/checkout.html?orderId=x".to_string());
    Arc::new(api)
  }

  pub fn fail(&self, op: &'static str, failure: Failure) {
    self.failures.lock().insert(op, failure);
  }

  pub fn recover(&self, op: &'static str) {
    self.failures.lock().remove(op);
  }

  pub fn set_sync_update(&self, update: Order) {
    self.sync_updates.lock().insert(update.id.clone(), update);
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().clone()
  }

  pub fn count(&self, op: &str) -> usize {
    self
      .calls
      .lock()
      .iter()
      .filter(|c| c.as_str() == op || c.starts_with(&format!("{op}:")))
      .count()
  }

  pub fn clear_calls(&self) {
    self.calls.lock().clear();
  }

  fn record(&self, op: &'static str, id: Option<&str>) -> Result<(), PayKitError> {
    let entry = match id {
      Some(id) => format!("{op}:{id}"),
      None => op.to_string(),
    };
    self.calls.lock().push(entry);
    match self.failures.lock().get(op) {
      Some(failure) => Err(failure.to_error()),
      None => Ok(()),
    }
  }

  fn find(&self, order_id: &str) -> Result<Order, PayKitError> {
    self
      .orders
      .lock()
      .iter()
      .find(|o| o.id == order_id)
      .cloned()
      .ok_or(PayKitError::Server {
        status: 404,
        message: Some("Order not found".to_string()),
      })
  }
}

#[async_trait]
impl OrdersApi for FakeApi {
  async fn signup(&self, _request: &SignupRequest) -> Result<TokenResponse, PayKitError> {
    self.record("signup", None)?;
    Ok(TokenResponse {
      token: self.token.lock().clone(),
    })
  }

  async fn login(&self, _credentials: &Credentials) -> Result<TokenResponse, PayKitError> {
    self.record("login", None)?;
    Ok(TokenResponse {
      token: self.token.lock().clone(),
    })
  }

  async fn list_orders(&self) -> Result<Vec<Order>, PayKitError> {
    self.record("list", None)?;
    Ok(self.orders.lock().clone())
  }

  async fn get_order(&self, order_id: &str) -> Result<Order, PayKitError> {
    self.record("get", Some(order_id))?;
    self.find(order_id)
  }

  async fn sync_order(&self, order_id: &str) -> Result<Order, PayKitError> {
    self.record("sync", Some(order_id))?;
    if let Some(update) = self.sync_updates.lock().get(order_id) {
      return Ok(update.clone());
    }
    self.find(order_id)
  }

  async fn order_status(&self, order_id: &str) -> Result<OrderStatusSnapshot, PayKitError> {
    self.record("status", Some(order_id))?;
    let order = self.find(order_id)?;
    Ok(OrderStatusSnapshot {
      id: order.id,
      status: order.status,
      razorpay_order_id: order.razorpay_order_id,
      ..Default::default()
    })
  }

  async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, PayKitError> {
    self.record("create", None)?;
    self.created.lock().push(request.clone());
    let created = Order {
      id: format!("new-{}", self.created.lock().len()),
      customer_name: Some(request.customer_name.clone()),
      customer_whatsapp: Some(request.customer_whatsapp.clone()),
      amount_paise: Some(request.amount_paise),
      description: request.description.clone(),
      status: Some(OrderStatus::Created),
      ..Default::default()
    };
    self.orders.lock().push(created.clone());
    Ok(created)
  }

  async fn send_payment(&self, order_id: &str) -> Result<Option<Order>, PayKitError> {
    self.record("send-payment", Some(order_id))?;
    let mut orders = self.orders.lock();
    let order = orders.iter_mut().find(|o| o.id == order_id);
    Ok(order.map(|o| {
      o.status = Some(OrderStatus::PaymentSent);
      o.razorpay_order_id = Some(format!("order_{order_id}"));
      o.clone()
    }))
  }

  async fn retry_payment(&self, order_id: &str) -> Result<Option<Order>, PayKitError> {
    self.record("retry", Some(order_id))?;
    Ok(None)
  }

  async fn refund(&self, order_id: &str) -> Result<Option<Order>, PayKitError> {
    self.record("refund", Some(order_id))?;
    Ok(None)
  }

  async fn checkout_link(&self, order_id: &str) -> Result<CheckoutLink, PayKitError> {
    self.record("checkout", Some(order_id))?;
    Ok(CheckoutLink {
      url: self.checkout_url.lock().clone(),
    })
  }

  async fn save_settings(&self, _settings: &TenantSettings, bearer: Option<&str>) -> Result<(), PayKitError> {
    self.record("settings", None)?;
    self.settings_bearers.lock().push(bearer.map(str::to_string));
    Ok(())
  }
}

// --- Checkout opener ---
#[derive(Default)]
pub struct RecordingOpener {
  pub opened: Mutex<Vec<Url>>,
}

impl CheckoutOpener for RecordingOpener {
  fn open(&self, url: &Url) -> Result<(), PayKitError> {
    self.opened.lock().push(url.clone());
    Ok(())
  }
}

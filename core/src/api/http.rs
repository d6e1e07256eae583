// core/src/api/http.rs

//! `reqwest` implementation of [`OrdersApi`].

use crate::api::OrdersApi;
use crate::error::PayKitError;
use crate::models::{
  CheckoutLink, CreateOrderRequest, Credentials, Order, OrderStatusSnapshot, SignupRequest, TenantSettings,
  TokenResponse,
};
use crate::session::TokenStore;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

/// HTTP client for the ChatPayKit API.
///
/// Every request goes through [`HttpApiClient::request`], which attaches the
/// session token as a bearer credential. No retries and no timeout beyond
/// what `reqwest` does by default.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
  http: Client,
  base: Url,
  tokens: TokenStore,
}

impl HttpApiClient {
  pub fn new(base: Url, tokens: TokenStore) -> Self {
    Self::with_client(Client::new(), base, tokens)
  }

  pub fn with_client(http: Client, base: Url, tokens: TokenStore) -> Self {
    Self { http, base, tokens }
  }

  /// Joins percent-encoded path segments onto the base address.
  pub fn endpoint(&self, segments: &[&str]) -> Result<Url, PayKitError> {
    let mut url = self.base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
      let mut path = url
        .path_segments_mut()
        .map_err(|()| PayKitError::Config(format!("API base '{}' cannot carry a path", self.base)))?;
      path.pop_if_empty().extend(segments);
    }
    Ok(url)
  }

  /// The single place credentials are attached. `bearer` takes precedence
  /// over the stored session token, so at most one Authorization header is
  /// ever sent.
  pub fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
    let builder = self.http.request(method, url);
    match bearer.map(str::to_owned).or_else(|| self.tokens.token()) {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  async fn call<B>(
    &self,
    method: Method,
    segments: &[&str],
    body: Option<&B>,
    bearer: Option<&str>,
  ) -> Result<Value, PayKitError>
  where
    B: Serialize + ?Sized + Sync,
  {
    let url = self.endpoint(segments)?;
    debug!(%method, path = url.path(), "Sending API request.");
    let mut builder = self.request(method, url, bearer);
    if let Some(body) = body {
      builder = builder.json(body);
    }

    let response = builder.send().await.map_err(|e| PayKitError::Transport {
      message: e.to_string(),
    })?;
    let status = response.status();
    let text = response.text().await.map_err(|e| PayKitError::Transport {
      message: e.to_string(),
    })?;

    if !status.is_success() {
      debug!(status = status.as_u16(), "API request rejected.");
      return Err(PayKitError::Server {
        status: status.as_u16(),
        message: server_message(&text),
      });
    }
    if text.trim().is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| PayKitError::MalformedPayload(format!("response is not JSON: {e}")))
  }

  async fn get(&self, segments: &[&str]) -> Result<Value, PayKitError> {
    self.call::<()>(Method::GET, segments, None, None).await
  }

  async fn post<B>(&self, segments: &[&str], body: &B) -> Result<Value, PayKitError>
  where
    B: Serialize + ?Sized + Sync,
  {
    self.call(Method::POST, segments, Some(body), None).await
  }

  async fn post_empty(&self, segments: &[&str]) -> Result<Value, PayKitError> {
    self.call::<()>(Method::POST, segments, None, None).await
  }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, PayKitError> {
  serde_json::from_value(value).map_err(|e| PayKitError::MalformedPayload(format!("unexpected {what}: {e}")))
}

/// Extracts the user-facing message from an error body: a JSON `message`
/// (or `error`) field, a JSON string, or the raw text.
pub fn server_message(body: &str) -> Option<String> {
  let trimmed = body.trim();
  if trimmed.is_empty() {
    return None;
  }
  let non_empty = |s: &str| {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
  };
  match serde_json::from_str::<Value>(trimmed) {
    Ok(Value::Object(fields)) => ["message", "error"]
      .iter()
      .find_map(|key| fields.get(*key).and_then(Value::as_str).and_then(non_empty)),
    Ok(Value::String(s)) => non_empty(&s),
    Ok(Value::Null) => None,
    Ok(_) | Err(_) => Some(trimmed.to_string()),
  }
}

#[async_trait]
impl OrdersApi for HttpApiClient {
  #[instrument(skip_all, err(Display))]
  async fn signup(&self, request: &SignupRequest) -> Result<TokenResponse, PayKitError> {
    let value = self.post(&["api", "auth", "signup"], request).await?;
    decode(value, "signup response")
  }

  #[instrument(skip_all, err(Display))]
  async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, PayKitError> {
    let value = self.post(&["api", "auth", "login"], credentials).await?;
    decode(value, "login response")
  }

  #[instrument(skip(self), err(Display))]
  async fn list_orders(&self) -> Result<Vec<Order>, PayKitError> {
    let value = self.get(&["api", "orders"]).await?;
    if !value.is_array() {
      return Err(PayKitError::MalformedPayload("Backend response is not a list.".to_string()));
    }
    decode(value, "order list")
  }

  #[instrument(skip(self), err(Display))]
  async fn get_order(&self, order_id: &str) -> Result<Order, PayKitError> {
    let value = self.get(&["api", "orders", order_id]).await?;
    decode(value, "order")
  }

  #[instrument(skip(self), err(Display))]
  async fn sync_order(&self, order_id: &str) -> Result<Order, PayKitError> {
    let value = self.get(&["api", "orders", order_id, "sync"]).await?;
    decode(value, "sync response")
  }

  #[instrument(skip(self), err(Display))]
  async fn order_status(&self, order_id: &str) -> Result<OrderStatusSnapshot, PayKitError> {
    let value = self.get(&["api", "orders", order_id, "status"]).await?;
    decode(value, "status response")
  }

  #[instrument(skip_all, fields(amount_paise = request.amount_paise), err(Display))]
  async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, PayKitError> {
    let value = self.post(&["api", "orders"], request).await?;
    decode(value, "created order")
  }

  #[instrument(skip(self), err(Display))]
  async fn send_payment(&self, order_id: &str) -> Result<Option<Order>, PayKitError> {
    let value = self.post_empty(&["api", "orders", order_id, "send-payment"]).await?;
    Ok(serde_json::from_value(value).ok())
  }

  #[instrument(skip(self), err(Display))]
  async fn retry_payment(&self, order_id: &str) -> Result<Option<Order>, PayKitError> {
    let value = self.post_empty(&["api", "orders", order_id, "retry"]).await?;
    Ok(serde_json::from_value(value).ok())
  }

  #[instrument(skip(self), err(Display))]
  async fn refund(&self, order_id: &str) -> Result<Option<Order>, PayKitError> {
    let value = self.post_empty(&["api", "orders", order_id, "refund"]).await?;
    Ok(serde_json::from_value(value).ok())
  }

  #[instrument(skip(self), err(Display))]
  async fn checkout_link(&self, order_id: &str) -> Result<CheckoutLink, PayKitError> {
    let value = self.get(&["api", "orders", order_id, "checkout"]).await?;
    if value.is_null() {
      return Ok(CheckoutLink::default());
    }
    decode(value, "checkout response")
  }

  #[instrument(skip_all, err(Display))]
  async fn save_settings(&self, settings: &TenantSettings, bearer: Option<&str>) -> Result<(), PayKitError> {
    self
      .call(Method::POST, &["api", "admin", "settings"], Some(settings), bearer)
      .await?;
    Ok(())
  }
}

// core/src/models/requests.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
  pub tenant_name: String,
  pub email: String,
  pub password: String,
}

/// Body of the login and signup responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
  pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
  pub customer_name: String,
  pub customer_whatsapp: String,
  pub amount_paise: i64,
  pub description: Option<String>,
}

/// Body of `GET /api/orders/{id}/checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutLink {
  pub url: Option<String>,
}

/// Per-tenant integration credentials submitted from the settings form.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettings {
  pub razorpay_key_id: String,
  pub razorpay_key_secret: String,
  pub razorpay_webhook_secret: String,
  pub whatsapp_access_token: String,
  pub whatsapp_phone_number_id: String,
}

// Secrets never reach logs through Debug.
impl fmt::Debug for TenantSettings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fn redact(secret: &str) -> &'static str {
      if secret.is_empty() {
        "<empty>"
      } else {
        "<redacted>"
      }
    }
    f.debug_struct("TenantSettings")
      .field("razorpay_key_id", &self.razorpay_key_id)
      .field("razorpay_key_secret", &redact(&self.razorpay_key_secret))
      .field("razorpay_webhook_secret", &redact(&self.razorpay_webhook_secret))
      .field("whatsapp_access_token", &redact(&self.whatsapp_access_token))
      .field("whatsapp_phone_number_id", &self.whatsapp_phone_number_id)
      .finish()
  }
}

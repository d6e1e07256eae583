// core/src/auth.rs

//! Login and signup: exchange credentials for a token and store it.

use crate::api::OrdersApi;
use crate::error::PayKitError;
use crate::models::{Credentials, Identity, SignupRequest, TokenResponse};
use crate::session::TokenStore;
use std::sync::Arc;
use tracing::{info, instrument};

pub const LOGIN_FALLBACK: &str = "Login failed";
pub const SIGNUP_FALLBACK: &str = "Signup failed";

#[derive(Clone)]
pub struct Authenticator {
  api: Arc<dyn OrdersApi>,
  tokens: TokenStore,
}

impl Authenticator {
  pub fn new(api: Arc<dyn OrdersApi>, tokens: TokenStore) -> Self {
    Self { api, tokens }
  }

  /// Logs in and returns the identity decoded from the new token, if any.
  #[instrument(skip_all)]
  pub async fn login(&self, email: &str, password: &str) -> Result<Option<Identity>, PayKitError> {
    let credentials = Credentials {
      email: email.trim().to_string(),
      password: password.to_string(),
    };
    let response = self.api.login(&credentials).await?;
    self.store(response)
  }

  /// Creates a tenant with its first admin and logs straight in.
  #[instrument(skip_all, fields(tenant = tenant_name.trim()))]
  pub async fn signup(&self, tenant_name: &str, email: &str, password: &str) -> Result<Option<Identity>, PayKitError> {
    let request = SignupRequest {
      tenant_name: tenant_name.trim().to_string(),
      email: email.trim().to_string(),
      password: password.to_string(),
    };
    let response = self.api.signup(&request).await?;
    self.store(response)
  }

  fn store(&self, response: TokenResponse) -> Result<Option<Identity>, PayKitError> {
    let token = response
      .token
      .filter(|t| !t.trim().is_empty())
      .ok_or_else(|| PayKitError::MalformedPayload("Response did not include a token".to_string()))?;
    self.tokens.set_token(&token)?;
    let identity = self.tokens.user();
    match &identity {
      Some(identity) => info!(user_id = %identity.user_id, role = %identity.role, "Signed in."),
      None => info!("Signed in with a token that carries no identity."),
    }
    Ok(identity)
  }
}

impl std::fmt::Debug for Authenticator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Authenticator").field("tokens", &self.tokens).finish()
  }
}

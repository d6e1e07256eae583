// core/src/session/token.rs
use crate::error::PayKitError;
use crate::models::{Identity, Role};
use crate::session::store::KeyValueStore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Decodes the payload segment of a JWT into an [`Identity`].
///
/// The signature is not checked. Returns `None` for anything that is not a
/// three-part token with a base64url JSON object in the middle. Missing
/// claims decode to empty strings, so a token without `role` yields
/// `Role::Other("")`.
pub fn decode_token(token: &str) -> Option<Identity> {
  let payload = token.split('.').nth(1)?;
  let normalized: String = payload
    .trim_end_matches('=')
    .chars()
    .map(|c| match c {
      '+' => '-',
      '/' => '_',
      other => other,
    })
    .collect();
  let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;
  let claims: serde_json::Map<String, Value> = serde_json::from_slice(&bytes).ok()?;

  fn claim(claims: &serde_json::Map<String, Value>, name: &str) -> String {
    match claims.get(name) {
      None | Some(Value::Null) => String::new(),
      Some(Value::String(s)) => s.clone(),
      Some(other) => other.to_string(),
    }
  }

  Some(Identity {
    user_id: claim(&claims, "userId"),
    tenant_id: claim(&claims, "tenantId"),
    role: Role::from(claim(&claims, "role")),
  })
}

/// The persisted session: a bearer token plus the identity decoded from it.
///
/// There is no expiry handling. A token is trusted until the server rejects it.
#[derive(Clone)]
pub struct TokenStore {
  store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
  pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
    Self { store }
  }

  /// Persists `token` and, when it decodes, the identity inside it.
  ///
  /// A malformed token is stored without an identity; any identity left from
  /// an earlier session is removed so the two never disagree.
  pub fn set_token(&self, token: &str) -> Result<(), PayKitError> {
    self.store.set(TOKEN_KEY, token)?;
    match decode_token(token) {
      Some(identity) => {
        let encoded = serde_json::to_string(&identity)
          .map_err(|e| PayKitError::Storage(format!("failed to encode identity: {e}")))?;
        self.store.set(USER_KEY, &encoded)?;
        debug!(user_id = %identity.user_id, tenant_id = %identity.tenant_id, role = %identity.role, "Session identity stored.");
      }
      None => {
        self.store.remove(USER_KEY)?;
        debug!("Token could not be decoded; no identity stored.");
      }
    }
    Ok(())
  }

  pub fn token(&self) -> Option<String> {
    match self.store.get(TOKEN_KEY) {
      Ok(token) => token.filter(|t| !t.is_empty()),
      Err(e) => {
        warn!(error = %e, "Failed to read stored token.");
        None
      }
    }
  }

  /// The stored identity. A corrupt record reads as absent.
  pub fn user(&self) -> Option<Identity> {
    let raw = match self.store.get(USER_KEY) {
      Ok(Some(raw)) => raw,
      Ok(None) => return None,
      Err(e) => {
        warn!(error = %e, "Failed to read stored identity.");
        return None;
      }
    };
    match serde_json::from_str(&raw) {
      Ok(identity) => Some(identity),
      Err(e) => {
        debug!(error = %e, "Stored identity is corrupt; ignoring it.");
        None
      }
    }
  }

  pub fn logout(&self) -> Result<(), PayKitError> {
    self.store.remove(TOKEN_KEY)?;
    self.store.remove(USER_KEY)?;
    debug!("Session cleared.");
    Ok(())
  }
}

impl std::fmt::Debug for TokenStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenStore")
      .field("has_token", &self.token().is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::MemoryStore;

  fn token_with(claims: &str) -> String {
    format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(claims))
  }

  #[test]
  fn decodes_claims_into_identity() {
    let token = token_with(r#"{"userId":"u-1","tenantId":"t-9","role":"ADMIN","exp":1}"#);
    let identity = decode_token(&token).unwrap();
    assert_eq!(identity.user_id, "u-1");
    assert_eq!(identity.tenant_id, "t-9");
    assert_eq!(identity.role, Role::Admin);
  }

  #[test]
  fn missing_role_decodes_to_an_unmatched_role() {
    let identity = decode_token(&token_with(r#"{"userId":42,"tenantId":"t"}"#)).unwrap();
    assert_eq!(identity.user_id, "42");
    assert_eq!(identity.role, Role::Other(String::new()));
  }

  #[test]
  fn malformed_tokens_decode_to_none() {
    assert!(decode_token("not-a-jwt").is_none());
    assert!(decode_token("a.%%%.c").is_none());
    assert!(decode_token(&token_with("[1,2]")).is_none());
  }

  #[test]
  fn malformed_token_is_stored_without_identity() {
    let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
    tokens
      .set_token(&token_with(r#"{"userId":"u","tenantId":"t","role":"STAFF"}"#))
      .unwrap();
    assert!(tokens.user().is_some());

    tokens.set_token("garbage").unwrap();
    assert_eq!(tokens.token().as_deref(), Some("garbage"));
    assert!(tokens.user().is_none());
  }

  #[test]
  fn corrupt_identity_record_reads_as_absent() {
    let store = Arc::new(MemoryStore::new());
    store.set(USER_KEY, "{not json").unwrap();
    let tokens = TokenStore::new(store);
    assert!(tokens.user().is_none());
  }
}

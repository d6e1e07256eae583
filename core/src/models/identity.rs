// core/src/models/identity.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role claim carried by the session token. Anything other than ADMIN or
/// STAFF is kept verbatim and never satisfies a required role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
  Admin,
  Staff,
  Other(String),
}

impl From<String> for Role {
  fn from(raw: String) -> Self {
    match raw.as_str() {
      "ADMIN" => Role::Admin,
      "STAFF" => Role::Staff,
      _ => Role::Other(raw),
    }
  }
}

impl From<Role> for String {
  fn from(role: Role) -> Self {
    match role {
      Role::Admin => "ADMIN".to_string(),
      Role::Staff => "STAFF".to_string(),
      Role::Other(raw) => raw,
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Role::Admin => f.write_str("ADMIN"),
      Role::Staff => f.write_str("STAFF"),
      Role::Other(raw) if raw.is_empty() => f.write_str("(none)"),
      Role::Other(raw) => f.write_str(raw),
    }
  }
}

/// Who the stored token says the user is. Decoded, never verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  pub user_id: String,
  pub tenant_id: String,
  pub role: Role,
}

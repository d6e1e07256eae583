// core/src/guard.rs

//! Route guarding on the decoded session identity.
//!
//! Evaluated synchronously once per navigation. There is no server round-trip,
//! so a stale or forged token passes here and fails at the API instead.

use crate::models::{Identity, Role};
use crate::session::TokenStore;
use std::fmt;

/// Console views, mirroring the console's routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Login,
  Orders,
  Settings,
}

impl Route {
  /// Where an authenticated but under-privileged visitor lands.
  pub const DEFAULT: Route = Route::Orders;

  pub fn path(self) -> &'static str {
    match self {
      Route::Login => "/login",
      Route::Orders => "/",
      Route::Settings => "/settings",
    }
  }

  pub fn is_protected(self) -> bool {
    !matches!(self, Route::Login)
  }

  pub fn required_role(self) -> Option<Role> {
    match self {
      Route::Settings => Some(Role::Admin),
      Route::Login | Route::Orders => None,
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.path())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
  RedirectToLogin,
  RedirectToDefault,
  Render,
}

/// Decides whether a protected view may render for `identity`.
pub fn require_auth(required_role: Option<&Role>, identity: Option<&Identity>) -> GuardDecision {
  let Some(identity) = identity else {
    return GuardDecision::RedirectToLogin;
  };
  match required_role {
    Some(role) if &identity.role != role => GuardDecision::RedirectToDefault,
    _ => GuardDecision::Render,
  }
}

/// Guards `route` with the identity currently held in `tokens`.
pub fn guard_route(route: Route, tokens: &TokenStore) -> GuardDecision {
  if !route.is_protected() {
    return GuardDecision::Render;
  }
  let user = tokens.user();
  let decision = require_auth(route.required_role().as_ref(), user.as_ref());
  tracing::debug!(route = %route, ?decision, "Route guard evaluated.");
  decision
}

// src/lib.rs

//! ChatPayKit client: the order and payment console of a multi-tenant
//! WhatsApp payment service.
//!
//! The crate covers what a merchant-facing front end needs:
//!  - A persisted session: bearer token plus the identity decoded from it.
//!  - A route guard deciding between login, the default view and a protected one.
//!  - An HTTP client that attaches the session token to every request.
//!  - An order board with merge-by-id loading, per-order reconciliation and a
//!    capped concurrent sweep of active orders on a background timer.
//!  - Manual order actions run as named step pipelines (`flow`).
//!  - The tenant settings and auth forms.
//!
//! Every user-facing failure is a [`PayKitError`]; front ends show
//! [`PayKitError::user_message`].

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod flow;
pub mod guard;
pub mod models;
pub mod orders;
pub mod session;
pub mod settings;

pub use crate::api::{HttpApiClient, OrdersApi};
pub use crate::auth::Authenticator;
pub use crate::config::ClientConfig;
pub use crate::error::{FlowError, PayKitError, PayKitResult};
pub use crate::guard::{guard_route, require_auth, GuardDecision, Route};
pub use crate::models::{Identity, Order, OrderStatus, Role};
pub use crate::orders::{
  ActionDispatcher, AutoRefresher, CheckoutOpener, NewOrderForm, OrderAction, OrderListViewModel, StatusFilter,
};
pub use crate::session::{FileStore, KeyValueStore, MemoryStore, TokenStore};
pub use crate::settings::submit_settings;

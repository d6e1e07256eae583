// core/src/settings.rs

//! Tenant integration settings.

use crate::api::OrdersApi;
use crate::error::PayKitError;
use crate::models::TenantSettings;
use crate::session::TokenStore;
use tracing::{info, instrument};

pub const SETTINGS_SAVED: &str = "Settings saved successfully";
pub const SETTINGS_FALLBACK: &str = "Failed to save settings";

/// Submits the five integration credentials with the stored token as an
/// explicit bearer. Without a token nothing is sent.
#[instrument(skip_all, fields(key_id = %settings.razorpay_key_id))]
pub async fn submit_settings(
  api: &dyn OrdersApi,
  tokens: &TokenStore,
  settings: &TenantSettings,
) -> Result<(), PayKitError> {
  let token = tokens
    .token()
    .ok_or_else(|| PayKitError::MissingToken("Not authenticated".to_string()))?;
  api.save_settings(settings, Some(&token)).await?;
  info!("Tenant settings saved.");
  Ok(())
}

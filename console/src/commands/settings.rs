// console/src/commands/settings.rs
use anyhow::anyhow;
use chatpaykit::models::TenantSettings;
use chatpaykit::settings::{SETTINGS_FALLBACK, SETTINGS_SAVED};
use chatpaykit::{submit_settings, Route};
use clap::Args;
use std::fmt;

use crate::state::ConsoleState;

#[derive(Args)]
pub struct SettingsArgs {
  #[arg(long, env = "RAZORPAY_KEY_ID")]
  razorpay_key_id: String,

  #[arg(long, env = "RAZORPAY_KEY_SECRET", hide_env_values = true)]
  razorpay_key_secret: String,

  #[arg(long, env = "RAZORPAY_WEBHOOK_SECRET", hide_env_values = true)]
  razorpay_webhook_secret: String,

  #[arg(long, env = "WHATSAPP_ACCESS_TOKEN", hide_env_values = true)]
  whatsapp_access_token: String,

  #[arg(long, env = "WHATSAPP_PHONE_NUMBER_ID")]
  whatsapp_phone_number_id: String,
}

impl SettingsArgs {
  fn to_settings(&self) -> TenantSettings {
    TenantSettings {
      razorpay_key_id: self.razorpay_key_id.clone(),
      razorpay_key_secret: self.razorpay_key_secret.clone(),
      razorpay_webhook_secret: self.razorpay_webhook_secret.clone(),
      whatsapp_access_token: self.whatsapp_access_token.clone(),
      whatsapp_phone_number_id: self.whatsapp_phone_number_id.clone(),
    }
  }
}

// Goes through the redacting Debug of TenantSettings.
impl fmt::Debug for SettingsArgs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(&self.to_settings(), f)
  }
}

pub async fn save(state: &ConsoleState, args: SettingsArgs) -> anyhow::Result<()> {
  state.require(Route::Settings)?;
  submit_settings(state.api.as_ref(), &state.tokens, &args.to_settings())
    .await
    .map_err(|err| anyhow!("{}", err.user_message(SETTINGS_FALLBACK)))?;
  println!("{SETTINGS_SAVED}");
  Ok(())
}

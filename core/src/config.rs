// core/src/config.rs

use crate::error::{PayKitError, PayKitResult};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_SESSION_FILE: &str = ".chatpaykit/session.json";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(4000);
pub const DEFAULT_SWEEP_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Origin of the ChatPayKit API, e.g. `http://localhost:8080`.
  pub api_base: Url,
  pub session_file: PathBuf,
  pub refresh_interval: Duration,
  /// Most orders reconciled by one background sweep.
  pub sweep_cap: usize,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      api_base: default_api_base(),
      session_file: PathBuf::from(DEFAULT_SESSION_FILE),
      refresh_interval: DEFAULT_REFRESH_INTERVAL,
      sweep_cap: DEFAULT_SWEEP_CAP,
    }
  }
}

fn default_api_base() -> Url {
  Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL")
}

impl ClientConfig {
  /// Loads `.env` if present, then reads the `CHATPAYKIT_*` variables.
  pub fn from_env() -> PayKitResult<Self> {
    dotenv().ok();
    let config = Self::from_lookup(|name| env::var(name).ok())?;
    tracing::debug!(api_base = %config.api_base, session_file = %config.session_file.display(), "Client configuration loaded.");
    Ok(config)
  }

  /// Builds a configuration from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PayKitResult<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let api_base = match get("CHATPAYKIT_API_BASE") {
      Some(raw) => parse_api_base(&raw)?,
      None => default_api_base(),
    };

    let session_file = get("CHATPAYKIT_SESSION_FILE")
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

    let refresh_interval = match get("CHATPAYKIT_REFRESH_INTERVAL_MS") {
      Some(raw) => {
        let millis = raw
          .parse::<u64>()
          .map_err(|e| PayKitError::Config(format!("Invalid CHATPAYKIT_REFRESH_INTERVAL_MS: {e}")))?;
        if millis == 0 {
          return Err(PayKitError::Config(
            "CHATPAYKIT_REFRESH_INTERVAL_MS must be greater than zero".to_string(),
          ));
        }
        Duration::from_millis(millis)
      }
      None => DEFAULT_REFRESH_INTERVAL,
    };

    let sweep_cap = match get("CHATPAYKIT_SWEEP_CAP") {
      Some(raw) => raw
        .parse::<usize>()
        .map_err(|e| PayKitError::Config(format!("Invalid CHATPAYKIT_SWEEP_CAP: {e}")))?,
      None => DEFAULT_SWEEP_CAP,
    };

    Ok(Self {
      api_base,
      session_file,
      refresh_interval,
      sweep_cap,
    })
  }
}

/// Parses an API origin; it must be an absolute http(s) URL.
pub fn parse_api_base(raw: &str) -> PayKitResult<Url> {
  let url = Url::parse(raw.trim()).map_err(|e| PayKitError::Config(format!("Invalid API base '{raw}': {e}")))?;
  if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
    return Err(PayKitError::Config(format!("API base '{raw}' must be an http(s) URL")));
  }
  Ok(url)
}

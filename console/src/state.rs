// console/src/state.rs
use anyhow::{bail, Context};
use chatpaykit::{
  guard_route, ActionDispatcher, Authenticator, ClientConfig, FileStore, GuardDecision, HttpApiClient,
  OrderListViewModel, Route, TokenStore,
};
use std::sync::Arc;

use crate::render::TerminalOpener;

/// Everything a command needs, built once per invocation.
#[derive(Clone)]
pub struct ConsoleState {
  pub config: Arc<ClientConfig>,
  pub tokens: TokenStore,
  pub api: Arc<HttpApiClient>,
}

impl ConsoleState {
  pub fn new(config: ClientConfig) -> Self {
    let tokens = TokenStore::new(Arc::new(FileStore::new(config.session_file.clone())));
    let api = Arc::new(HttpApiClient::new(config.api_base.clone(), tokens.clone()));
    tracing::debug!(api_base = %config.api_base, session = %config.session_file.display(), "Console state ready.");
    Self {
      config: Arc::new(config),
      tokens,
      api,
    }
  }

  pub fn board(&self) -> OrderListViewModel {
    OrderListViewModel::with_sweep_cap(self.api.clone(), self.config.sweep_cap)
  }

  pub fn dispatcher(&self, board: &OrderListViewModel) -> anyhow::Result<ActionDispatcher> {
    ActionDispatcher::new(
      board.clone(),
      self.tokens.clone(),
      Arc::new(TerminalOpener),
      Some(self.config.api_base.clone()),
    )
    .context("failed to build order action pipelines")
  }

  pub fn authenticator(&self) -> Authenticator {
    Authenticator::new(self.api.clone(), self.tokens.clone())
  }

  /// Applies the route guard; a redirect becomes an error naming where to go.
  pub fn require(&self, route: Route) -> anyhow::Result<()> {
    match guard_route(route, &self.tokens) {
      GuardDecision::Render => Ok(()),
      GuardDecision::RedirectToLogin => bail!("Not logged in. Run `chatpaykit-console login` first."),
      GuardDecision::RedirectToDefault => {
        let role = route
          .required_role()
          .map_or_else(|| "another".to_string(), |role| role.to_string());
        bail!("{route} needs the {role} role; try `chatpaykit-console orders` instead.")
      }
    }
  }
}

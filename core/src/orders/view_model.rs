// core/src/orders/view_model.rs

//! The order board: the keyed order collection plus the status indicators a
//! front end renders around it.

use crate::api::OrdersApi;
use crate::config::DEFAULT_SWEEP_CAP;
use crate::error::PayKitError;
use crate::flow::ContextData;
use crate::models::Order;
use crate::orders::form::NewOrderForm;
use crate::orders::listing::{filter_orders, merge_listing, select_active, status_options, StatusFilter};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const LOAD_FALLBACK: &str = "Failed to load orders";
pub const SYNC_FALLBACK: &str = "Sync failed";
pub const CREATE_FALLBACK: &str = "Create failed";

pub const SYNCED_MESSAGE: &str = "Live status updated";
pub const CREATED_MESSAGE: &str = "Order created";

#[derive(Debug, Clone, Default)]
pub struct OrderListState {
  pub orders: IndexMap<String, Order>,
  pub loading: bool,
  pub last_error: Option<String>,
  pub last_info: Option<String>,
  /// At most one order is busy with a manual action.
  pub busy_order_id: Option<String>,
  pub last_updated_at: Option<DateTime<Utc>>,
  pub auto_refresh_enabled: bool,
}

/// Shared handle to the order board. Clones see the same state.
///
/// Public operations never return errors: failures land in
/// [`OrderListState::last_error`] as a display string.
#[derive(Clone)]
pub struct OrderListViewModel {
  state: ContextData<OrderListState>,
  api: Arc<dyn OrdersApi>,
  sweep_cap: usize,
}

impl OrderListViewModel {
  pub fn new(api: Arc<dyn OrdersApi>) -> Self {
    Self::with_sweep_cap(api, DEFAULT_SWEEP_CAP)
  }

  pub fn with_sweep_cap(api: Arc<dyn OrdersApi>, sweep_cap: usize) -> Self {
    Self {
      state: ContextData::default(),
      api,
      sweep_cap,
    }
  }

  pub fn api(&self) -> &Arc<dyn OrdersApi> {
    &self.api
  }

  pub fn snapshot(&self) -> OrderListState {
    self.state.read().clone()
  }

  pub fn orders(&self) -> Vec<Order> {
    self.state.read().orders.values().cloned().collect()
  }

  pub fn order(&self, order_id: &str) -> Option<Order> {
    self.state.read().orders.get(order_id).cloned()
  }

  pub fn len(&self) -> usize {
    self.state.read().orders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn is_loading(&self) -> bool {
    self.state.read().loading
  }

  pub fn last_error(&self) -> Option<String> {
    self.state.read().last_error.clone()
  }

  pub fn last_info(&self) -> Option<String> {
    self.state.read().last_info.clone()
  }

  pub fn busy_order_id(&self) -> Option<String> {
    self.state.read().busy_order_id.clone()
  }

  pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
    self.state.read().last_updated_at
  }

  pub fn auto_refresh_enabled(&self) -> bool {
    self.state.read().auto_refresh_enabled
  }

  pub fn filtered_orders(&self, query: &str, filter: StatusFilter) -> Vec<Order> {
    let state = self.state.read();
    filter_orders(state.orders.values(), query, filter)
      .into_iter()
      .cloned()
      .collect()
  }

  pub fn status_options(&self) -> Vec<StatusFilter> {
    status_options(self.state.read().orders.values())
  }

  /// Fetches the whole collection. A silent load leaves the loading, error
  /// and info indicators untouched.
  #[instrument(skip(self))]
  pub async fn load(&self, silent: bool) {
    if !silent {
      self.state.update(|s| {
        s.loading = true;
        s.last_error = None;
        s.last_info = None;
      });
    }

    match self.fetch_and_merge().await {
      Ok(count) => debug!(count, "Order list loaded."),
      Err(err) => {
        let malformed = matches!(err, PayKitError::MalformedPayload(_));
        if silent {
          debug!(error = %err, "Silent order list load failed.");
        } else {
          warn!(error = %err, "Order list load failed.");
        }
        self.state.update(|s| {
          // A list that could not be read is dropped; a transport hiccup
          // during background polling keeps what is on screen.
          if malformed || !silent {
            s.orders.clear();
          }
          if !silent {
            s.last_error = Some(err.user_message(LOAD_FALLBACK));
          }
        });
      }
    }

    if !silent {
      self.state.update(|s| s.loading = false);
    }
  }

  /// Reconciles one order against the gateway. A visible reconcile marks the
  /// order busy while it runs.
  #[instrument(skip(self))]
  pub async fn reconcile_one(&self, order_id: &str, silent: bool) {
    if !silent {
      self.state.update(|s| {
        s.busy_order_id = Some(order_id.to_string());
        s.last_error = None;
        s.last_info = None;
      });
    }

    let outcome = self.fetch_and_reconcile(order_id).await;

    if silent {
      if let Err(err) = outcome {
        debug!(error = %err, "Silent reconcile failed.");
      }
      return;
    }
    self.state.update(|s| {
      match &outcome {
        Ok(()) => s.last_info = Some(SYNCED_MESSAGE.to_string()),
        Err(err) => s.last_error = Some(err.user_message(SYNC_FALLBACK)),
      }
      s.busy_order_id = None;
    });
  }

  /// Reconciles up to the sweep cap of non-terminal orders concurrently and
  /// waits for all of them. Individual failures are swallowed. Returns how
  /// many orders were selected.
  #[instrument(skip(self), fields(cap = self.sweep_cap))]
  pub async fn reconcile_active_sweep(&self) -> usize {
    let selected = select_active(&self.state.map_read(|s| &s.orders), self.sweep_cap);
    let outcomes = join_all(selected.iter().map(|id| self.fetch_and_reconcile(id))).await;
    let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
    self.state.update(|s| s.last_updated_at = Some(Utc::now()));
    debug!(selected = selected.len(), failed, "Active order sweep finished.");
    selected.len()
  }

  /// Validates the form locally, creates the order and reloads the list.
  /// Returns the created order.
  #[instrument(skip_all)]
  pub async fn create_order(&self, form: &NewOrderForm) -> Option<Order> {
    self.clear_messages();

    let request = match form.validate() {
      Ok(request) => request,
      Err(err) => {
        self.report_error(err.user_message(CREATE_FALLBACK));
        return None;
      }
    };

    match self.api.create_order(&request).await {
      Ok(order) => {
        info!(order_id = %order.id, amount_paise = request.amount_paise, "Order created.");
        self.load(false).await;
        if self.last_error().is_none() {
          self.report_info(CREATED_MESSAGE);
        }
        Some(order)
      }
      Err(err) => {
        self.report_error(err.user_message(CREATE_FALLBACK));
        None
      }
    }
  }

  /// List fetch and merge without touching any indicator.
  async fn fetch_and_merge(&self) -> Result<usize, PayKitError> {
    let incoming = self.api.list_orders().await?;
    let count = incoming.len();
    self.state.update(|s| {
      s.orders = merge_listing(&s.orders, incoming);
      s.last_updated_at = Some(Utc::now());
    });
    Ok(count)
  }

  /// Sync call folded into the matching order without touching any indicator.
  async fn fetch_and_reconcile(&self, order_id: &str) -> Result<(), PayKitError> {
    let update = self.api.sync_order(order_id).await?;
    self.state.update(|s| {
      match s.orders.get_mut(order_id) {
        Some(order) => order.absorb(update),
        None => debug!(order_id, "Reconciled order is not in the collection."),
      }
      s.last_updated_at = Some(Utc::now());
    });
    Ok(())
  }

  /// Claims the busy slot for `order_id`. Fails when another order holds it.
  pub(crate) fn begin_action(&self, order_id: &str) -> bool {
    self.state.update(|s| {
      if s.busy_order_id.is_some() {
        return false;
      }
      s.busy_order_id = Some(order_id.to_string());
      s.last_error = None;
      s.last_info = None;
      true
    })
  }

  pub(crate) fn finish_action(&self) {
    self.state.update(|s| s.busy_order_id = None);
  }

  pub(crate) fn clear_messages(&self) {
    self.state.update(|s| {
      s.last_error = None;
      s.last_info = None;
    });
  }

  pub(crate) fn report_info(&self, message: impl Into<String>) {
    let message = message.into();
    self.state.update(|s| s.last_info = Some(message));
  }

  pub(crate) fn report_error(&self, message: impl Into<String>) {
    let message = message.into();
    self.state.update(|s| s.last_error = Some(message));
  }

  pub(crate) fn set_auto_refresh_flag(&self, enabled: bool) {
    self.state.update(|s| s.auto_refresh_enabled = enabled);
  }
}

impl std::fmt::Debug for OrderListViewModel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let state = self.state.read();
    f.debug_struct("OrderListViewModel")
      .field("orders", &state.orders.len())
      .field("busy_order_id", &state.busy_order_id)
      .field("auto_refresh_enabled", &state.auto_refresh_enabled)
      .field("sweep_cap", &self.sweep_cap)
      .finish()
  }
}

// core/src/orders/dispatcher.rs

//! Manual order actions (send payment, checkout, retry, refund) as step
//! pipelines over the order board.

use crate::error::{FlowError, PayKitError};
use crate::flow::{ContextData, Pipeline, PipelineControl, PipelineResult};
use crate::models::{Order, OrderStatus};
use crate::orders::view_model::OrderListViewModel;
use crate::session::TokenStore;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::{form_urlencoded, Url};

pub const ACTION_FALLBACK: &str = "Action failed";
pub const CHECKOUT_FALLBACK: &str = "Checkout failed";
const NO_CHECKOUT_URL: &str = "No checkout url returned";
const MISSING_TOKEN: &str = "Missing auth token. Please login again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
  SendPayment,
  Checkout,
  Retry,
  Refund,
}

impl OrderAction {
  /// Advisory gate on the effective status. An order without a status is
  /// treated as freshly created.
  pub fn is_enabled_for(self, status: Option<OrderStatus>) -> bool {
    let status = status.unwrap_or(OrderStatus::Created);
    match self {
      OrderAction::SendPayment => matches!(status, OrderStatus::Created | OrderStatus::Failed),
      OrderAction::Checkout => matches!(status, OrderStatus::PaymentSent | OrderStatus::Failed),
      OrderAction::Retry => status == OrderStatus::Failed,
      OrderAction::Refund => status == OrderStatus::Paid,
    }
  }

  pub fn success_message(self) -> &'static str {
    match self {
      OrderAction::SendPayment => "Payment request sent",
      OrderAction::Checkout => "Checkout opened",
      OrderAction::Retry => "Retry initiated",
      OrderAction::Refund => "Refund initiated",
    }
  }

  pub fn fallback_message(self) -> &'static str {
    match self {
      OrderAction::Checkout => CHECKOUT_FALLBACK,
      _ => ACTION_FALLBACK,
    }
  }
}

impl fmt::Display for OrderAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      OrderAction::SendPayment => "send-payment",
      OrderAction::Checkout => "checkout",
      OrderAction::Retry => "retry",
      OrderAction::Refund => "refund",
    })
  }
}

/// Hands a checkout URL to whatever can show it (a browser, a terminal).
pub trait CheckoutOpener: Send + Sync {
  fn open(&self, url: &Url) -> Result<(), PayKitError>;
}

/// Per-dispatch data threaded through the pipeline steps.
#[derive(Debug, Clone)]
pub struct ActionContext {
  pub order_id: String,
  pub action: OrderAction,
  pub has_gateway_order: bool,
  pub checkout_url: Option<Url>,
}

type ActionPipeline = Pipeline<ActionContext, PayKitError>;

const DIRECT_STEPS: &[(&str, bool)] = &[
  ("perform_request", false),
  ("report_success", false),
  ("reload_orders", false),
  ("reconcile_order", false),
];

const CHECKOUT_STEPS: &[(&str, bool)] = &[
  ("request_gateway_order", false),
  ("reload_after_payment_request", false),
  ("fetch_checkout_url", false),
  ("attach_token", false),
  ("open_checkout", false),
  ("reconcile_order", false),
];

/// Runs one action at a time against the shared order board.
#[derive(Debug)]
pub struct ActionDispatcher {
  vm: OrderListViewModel,
  direct: ActionPipeline,
  checkout: ActionPipeline,
}

impl ActionDispatcher {
  /// `checkout_base` resolves relative checkout URLs; absolute ones are used
  /// as returned.
  pub fn new(
    vm: OrderListViewModel,
    tokens: TokenStore,
    opener: Arc<dyn CheckoutOpener>,
    checkout_base: Option<Url>,
  ) -> Result<Self, FlowError> {
    let direct = build_direct_pipeline(&vm)?;
    let checkout = build_checkout_pipeline(&vm, tokens, opener, checkout_base)?;
    Ok(Self { vm, direct, checkout })
  }

  pub fn pipeline_for(&self, action: OrderAction) -> &ActionPipeline {
    match action {
      OrderAction::Checkout => &self.checkout,
      _ => &self.direct,
    }
  }

  /// Runs `action` on `order_id`. Returns whether the action went through.
  ///
  /// An action the gate rejects is refused unless `force` is set, and nothing
  /// runs while another order is busy. Once the server has accepted the
  /// action, the follow-up reload and reconcile are silent and cannot fail
  /// it. The busy slot is released whatever the outcome; the failure message
  /// is left on the board.
  #[instrument(skip(self, action), fields(action = %action))]
  pub async fn dispatch(&self, order_id: &str, action: OrderAction, force: bool) -> bool {
    let order = self.vm.order(order_id);
    let status = order.as_ref().and_then(Order::effective_status);

    if !force && !action.is_enabled_for(status) {
      let shown = status.map_or_else(|| "unknown".to_string(), |s| s.to_string());
      self
        .vm
        .report_error(format!("Cannot {action} an order in status {shown}"));
      return false;
    }
    if !self.vm.begin_action(order_id) {
      self.vm.report_error("Another order action is still running");
      return false;
    }

    let ctx = ContextData::new(ActionContext {
      order_id: order_id.to_string(),
      action,
      has_gateway_order: order.as_ref().is_some_and(Order::has_gateway_order),
      checkout_url: None,
    });

    let completed = match self.pipeline_for(action).run(ctx).await {
      Ok(PipelineResult::Completed) => {
        info!(order_id, "Order action completed.");
        true
      }
      // The stopping step has already put its message on the board.
      Ok(PipelineResult::Stopped) => {
        info!(order_id, "Order action stopped before completion.");
        false
      }
      Err(err) => {
        warn!(order_id, error = %err, "Order action failed.");
        self.vm.report_error(err.user_message(action.fallback_message()));
        false
      }
    };
    self.vm.finish_action();
    completed
  }
}

fn order_id(ctx: &ContextData<ActionContext>) -> String {
  ctx.read().order_id.clone()
}

fn build_direct_pipeline(vm: &OrderListViewModel) -> Result<ActionPipeline, FlowError> {
  let mut pipeline = ActionPipeline::new("order_action", DIRECT_STEPS);

  let api = vm.api().clone();
  pipeline.on_root("perform_request", move |ctx: ContextData<ActionContext>| {
    let api = api.clone();
    async move {
      let (order_id, action) = {
        let c = ctx.read();
        (c.order_id.clone(), c.action)
      };
      match action {
        OrderAction::SendPayment => api.send_payment(&order_id).await?,
        OrderAction::Retry => api.retry_payment(&order_id).await?,
        OrderAction::Refund => api.refund(&order_id).await?,
        OrderAction::Checkout => {
          return Err(PayKitError::Validation("checkout has no single request".to_string()));
        }
      };
      Ok::<_, PayKitError>(PipelineControl::Continue)
    }
  })?;

  let board = vm.clone();
  pipeline.on_root("report_success", move |ctx: ContextData<ActionContext>| {
    let board = board.clone();
    async move {
      let action = ctx.read().action;
      board.report_info(action.success_message());
      Ok::<_, PayKitError>(PipelineControl::Continue)
    }
  })?;

  register_reload(&mut pipeline, "reload_orders", vm)?;
  register_reconcile(&mut pipeline, vm)?;
  Ok(pipeline)
}

fn build_checkout_pipeline(
  vm: &OrderListViewModel,
  tokens: TokenStore,
  opener: Arc<dyn CheckoutOpener>,
  checkout_base: Option<Url>,
) -> Result<ActionPipeline, FlowError> {
  let mut pipeline = ActionPipeline::new("checkout", CHECKOUT_STEPS);

  // Both payment-request steps only run before the gateway order exists.
  pipeline.set_skip_condition("request_gateway_order", |ctx| ctx.read().has_gateway_order)?;
  pipeline.set_skip_condition("reload_after_payment_request", |ctx| ctx.read().has_gateway_order)?;

  let api = vm.api().clone();
  pipeline.on_root("request_gateway_order", move |ctx: ContextData<ActionContext>| {
    let api = api.clone();
    async move {
      api.send_payment(&order_id(&ctx)).await?;
      Ok::<_, PayKitError>(PipelineControl::Continue)
    }
  })?;

  register_reload(&mut pipeline, "reload_after_payment_request", vm)?;

  let api = vm.api().clone();
  let board = vm.clone();
  pipeline.on_root("fetch_checkout_url", move |ctx: ContextData<ActionContext>| {
    let api = api.clone();
    let board = board.clone();
    let base = checkout_base.clone();
    async move {
      let link = api.checkout_link(&order_id(&ctx)).await?;
      let Some(raw) = link.url.filter(|u| !u.trim().is_empty()) else {
        board.report_error(NO_CHECKOUT_URL);
        return Ok::<_, PayKitError>(PipelineControl::Stop);
      };
      let parsed = match &base {
        Some(base) => base.join(raw.trim()),
        None => Url::parse(raw.trim()),
      }
      .map_err(|e| PayKitError::MalformedPayload(format!("Invalid checkout url '{raw}': {e}")))?;
      ctx.write().checkout_url = Some(parsed);
      Ok::<_, PayKitError>(PipelineControl::Continue)
    }
  })?;

  let board = vm.clone();
  pipeline.on_root("attach_token", move |ctx: ContextData<ActionContext>| {
    let tokens = tokens.clone();
    let board = board.clone();
    async move {
      let Some(token) = tokens.token() else {
        board.report_error(MISSING_TOKEN);
        return Ok::<_, PayKitError>(PipelineControl::Stop);
      };
      let mut c = ctx.write();
      let url = c
        .checkout_url
        .as_mut()
        .ok_or_else(|| PayKitError::MalformedPayload(NO_CHECKOUT_URL.to_string()))?;
      // Only the new pair is encoded; the server's query string is kept as issued.
      let token: String = form_urlencoded::byte_serialize(token.as_bytes()).collect();
      let query = match url.query().filter(|q| !q.is_empty()) {
        Some(existing) => format!("{existing}&token={token}"),
        None => format!("token={token}"),
      };
      url.set_query(Some(&query));
      Ok::<_, PayKitError>(PipelineControl::Continue)
    }
  })?;

  let board = vm.clone();
  pipeline.on_root("open_checkout", move |ctx: ContextData<ActionContext>| {
    let opener = opener.clone();
    let board = board.clone();
    async move {
      let url = ctx
        .read()
        .checkout_url
        .clone()
        .ok_or_else(|| PayKitError::MalformedPayload(NO_CHECKOUT_URL.to_string()))?;
      opener.open(&url)?;
      board.report_info(OrderAction::Checkout.success_message());
      Ok::<_, PayKitError>(PipelineControl::Continue)
    }
  })?;

  register_reconcile(&mut pipeline, vm)?;
  Ok(pipeline)
}

fn register_reload(pipeline: &mut ActionPipeline, step: &str, vm: &OrderListViewModel) -> Result<(), FlowError> {
  let board = vm.clone();
  pipeline.on_root(step, move |_ctx: ContextData<ActionContext>| {
    let board = board.clone();
    async move {
      board.load(true).await;
      Ok::<_, PayKitError>(PipelineControl::Continue)
    }
  })
}

fn register_reconcile(pipeline: &mut ActionPipeline, vm: &OrderListViewModel) -> Result<(), FlowError> {
  let board = vm.clone();
  pipeline.on_root("reconcile_order", move |ctx: ContextData<ActionContext>| {
    let board = board.clone();
    async move {
      board.reconcile_one(&order_id(&ctx), true).await;
      Ok::<_, PayKitError>(PipelineControl::Continue)
    }
  })
}

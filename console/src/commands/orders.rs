// console/src/commands/orders.rs
use anyhow::{anyhow, bail, Context};
use chatpaykit::orders::form::DEFAULT_AMOUNT_RUPEES;
use chatpaykit::{AutoRefresher, NewOrderForm, OrderAction, OrderListViewModel, OrdersApi, Route, StatusFilter};
use clap::Args;
use std::time::Duration;
use tracing::{info, instrument};

use super::fail_on_board_error;
use crate::cli::{parse_millis, parse_status_filter, ActionArgs};
use crate::render;
use crate::state::ConsoleState;

#[derive(Debug, Args)]
pub struct ListArgs {
  /// Match against customer name, WhatsApp number or order id
  #[arg(long, short, default_value = "")]
  search: String,

  /// ALL or one order status
  #[arg(long, default_value = "ALL", value_parser = parse_status_filter)]
  status: StatusFilter,

  /// Reconcile active orders with the gateway before printing
  #[arg(long)]
  live: bool,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
  /// Amount in rupees, e.g. 500 or 500.50
  #[arg(long, default_value = DEFAULT_AMOUNT_RUPEES)]
  amount: String,

  /// Customer name
  #[arg(long)]
  name: String,

  /// Customer WhatsApp number, digits only
  #[arg(long)]
  whatsapp: String,

  #[arg(long, default_value = "")]
  description: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
  #[arg(long, short, default_value = "")]
  search: String,

  #[arg(long, default_value = "ALL", value_parser = parse_status_filter)]
  status: StatusFilter,

  /// Poll period in milliseconds; defaults to CHATPAYKIT_REFRESH_INTERVAL_MS
  #[arg(long, value_parser = parse_millis)]
  interval_ms: Option<Duration>,
}

fn print_board(board: &OrderListViewModel, search: &str, filter: StatusFilter) {
  let shown = board.filtered_orders(search, filter);
  let state = board.snapshot();
  println!("{}", render::board_header(&state, shown.len(), filter));
  println!("{}", render::orders_table(&shown, state.busy_order_id.as_deref()));
  println!("{}", render::status_options_line(&board.status_options()));
}

fn print_messages(board: &OrderListViewModel) {
  if let Some(info) = board.last_info() {
    println!("{info}");
  }
}

async fn loaded_board(state: &ConsoleState) -> anyhow::Result<OrderListViewModel> {
  let board = state.board();
  board.load(false).await;
  fail_on_board_error(&board)?;
  Ok(board)
}

#[instrument(skip_all)]
pub async fn list(state: &ConsoleState, args: ListArgs) -> anyhow::Result<()> {
  state.require(Route::Orders)?;
  let board = loaded_board(state).await?;
  if args.live {
    let swept = board.reconcile_active_sweep().await;
    info!(swept, "Reconciled active orders before listing.");
  }
  print_board(&board, &args.search, args.status);
  Ok(())
}

#[instrument(skip(state))]
pub async fn show(state: &ConsoleState, order_id: &str) -> anyhow::Result<()> {
  state.require(Route::Orders)?;
  let order = state
    .api
    .get_order(order_id)
    .await
    .map_err(|err| anyhow!("{}", err.user_message("Failed to load order")))?;
  println!("{}", render::order_details(&order));
  Ok(())
}

#[instrument(skip(state))]
pub async fn status(state: &ConsoleState, order_id: &str) -> anyhow::Result<()> {
  state.require(Route::Orders)?;
  let snapshot = state
    .api
    .order_status(order_id)
    .await
    .map_err(|err| anyhow!("{}", err.user_message("Failed to load order status")))?;
  println!("{}", render::status_snapshot(&snapshot));
  Ok(())
}

#[instrument(skip_all)]
pub async fn create(state: &ConsoleState, args: CreateArgs) -> anyhow::Result<()> {
  state.require(Route::Orders)?;
  let board = state.board();
  let form = NewOrderForm {
    amount_rupees: args.amount,
    customer_name: args.name,
    customer_whatsapp: args.whatsapp,
    description: args.description,
  };
  let Some(created) = board.create_order(&form).await else {
    fail_on_board_error(&board)?;
    bail!("Create failed");
  };
  print_messages(&board);
  let shown = board.order(&created.id).unwrap_or(created);
  println!("{}", render::order_details(&shown));
  Ok(())
}

#[instrument(skip(state))]
pub async fn sync(state: &ConsoleState, order_id: &str) -> anyhow::Result<()> {
  state.require(Route::Orders)?;
  let board = loaded_board(state).await?;
  if board.order(order_id).is_none() {
    bail!("Order {order_id} is not on the board");
  }
  board.reconcile_one(order_id, false).await;
  fail_on_board_error(&board)?;
  print_messages(&board);
  if let Some(order) = board.order(order_id) {
    println!("{}", render::order_details(&order));
  }
  Ok(())
}

#[instrument(skip(state, args), fields(order_id = %args.id, force = args.force))]
pub async fn act(state: &ConsoleState, action: OrderAction, args: ActionArgs) -> anyhow::Result<()> {
  state.require(Route::Orders)?;
  let board = loaded_board(state).await?;
  let dispatcher = state.dispatcher(&board)?;

  let succeeded = dispatcher.dispatch(&args.id, action, args.force).await;
  print_messages(&board);
  if !succeeded {
    fail_on_board_error(&board)?;
    bail!("{}", action.fallback_message());
  }
  if let Some(order) = board.order(&args.id) {
    println!("{}", render::order_details(&order));
  }
  Ok(())
}

pub async fn watch(state: &ConsoleState, args: WatchArgs) -> anyhow::Result<()> {
  state.require(Route::Orders)?;
  let board = loaded_board(state).await?;
  print_board(&board, &args.search, args.status);

  let period = args.interval_ms.unwrap_or(state.config.refresh_interval);
  let mut refresher = AutoRefresher::new(board.clone(), period);
  let mut ticks = refresher.subscribe();
  refresher.set_enabled(true);
  eprintln!("Refreshing every {} ms. Press Ctrl-C to stop.", period.as_millis());

  loop {
    tokio::select! {
      changed = ticks.changed() => {
        if changed.is_err() {
          break;
        }
        print_board(&board, &args.search, args.status);
      }
      signal = tokio::signal::ctrl_c() => {
        signal.context("failed to listen for Ctrl-C")?;
        break;
      }
    }
  }

  refresher.shutdown().await;
  Ok(())
}

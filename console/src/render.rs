// console/src/render.rs

//! Terminal rendering of orders, snapshots and identities.

use chatpaykit::models::{Identity, Order, OrderStatusSnapshot};
use chatpaykit::orders::OrderListState;
use chatpaykit::{CheckoutOpener, PayKitError, StatusFilter};
use chrono::{DateTime, Local, Utc};
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use url::Url;

const NONE: &str = "-";

/// Prints the checkout link instead of launching a browser.
pub struct TerminalOpener;

impl CheckoutOpener for TerminalOpener {
  fn open(&self, url: &Url) -> Result<(), PayKitError> {
    println!("Open this link to complete the payment:\n  {url}");
    Ok(())
  }
}

pub fn format_paise(paise: Option<i64>) -> String {
  paise.map_or_else(|| NONE.to_string(), |p| format!("₹{:.2}", p as f64 / 100.0))
}

/// Long gateway ids as `first8…last4`.
pub fn short_id(id: Option<&str>) -> String {
  let Some(id) = id.filter(|id| !id.is_empty()) else {
    return NONE.to_string();
  };
  let chars: Vec<char> = id.chars().collect();
  if chars.len() <= 12 {
    return id.to_string();
  }
  let head: String = chars[..8].iter().collect();
  let tail: String = chars[chars.len() - 4..].iter().collect();
  format!("{head}…{tail}")
}

pub fn format_time(at: Option<DateTime<Utc>>) -> String {
  at.map_or_else(
    || NONE.to_string(),
    |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
  )
}

fn text(value: Option<&str>) -> String {
  value
    .filter(|v| !v.trim().is_empty())
    .map_or_else(|| NONE.to_string(), str::to_string)
}

fn status_text<T: ToString>(status: Option<T>) -> String {
  status.map_or_else(|| NONE.to_string(), |s| s.to_string())
}

pub fn board_header(state: &OrderListState, shown: usize, filter: StatusFilter) -> String {
  let updated = state.last_updated_at.map_or_else(
    || NONE.to_string(),
    |at| at.with_timezone(&Local).format("%H:%M:%S").to_string(),
  );
  let live = if state.auto_refresh_enabled { " · live" } else { "" };
  format!(
    "Orders ({total}) · showing {shown} [{filter}] · last updated {updated}{live}",
    total = state.orders.len()
  )
}

pub fn status_options_line(options: &[StatusFilter]) -> String {
  let names: Vec<String> = options.iter().map(ToString::to_string).collect();
  format!("Statuses: {}", names.join(", "))
}

pub fn orders_table(orders: &[Order], busy_order_id: Option<&str>) -> String {
  if orders.is_empty() {
    return "No orders.".to_string();
  }
  let mut builder = Builder::default();
  builder.push_record([
    "", "Id", "Customer", "WhatsApp", "Amount", "Status", "Live", "Gateway order", "Attempts", "Created",
  ]);
  for order in orders {
    let busy = if busy_order_id == Some(order.id.as_str()) { "*" } else { "" };
    builder.push_record([
      busy.to_string(),
      order.id.clone(),
      text(order.customer_name.as_deref()),
      text(order.customer_whatsapp.as_deref()),
      format_paise(order.amount_paise),
      status_text(order.status),
      status_text(order.effective_status()),
      short_id(order.razorpay_order_id.as_deref()),
      order.attempt_count.map_or_else(|| NONE.to_string(), |n| n.to_string()),
      format_time(order.created_at),
    ]);
  }
  let mut table = builder.build();
  table.with(Style::modern_rounded());
  table.modify(Columns::new(4..5), Alignment::right());
  table.to_string()
}

fn details_table(rows: Vec<(&str, String)>) -> String {
  let mut builder = Builder::default();
  for (field, value) in rows {
    builder.push_record([field.to_string(), value]);
  }
  let mut table = builder.build();
  table.with(Style::rounded());
  table.modify(Columns::first(), Alignment::right());
  table.to_string()
}

pub fn order_details(order: &Order) -> String {
  details_table(vec![
    ("Id", order.id.clone()),
    ("Customer", text(order.customer_name.as_deref())),
    ("WhatsApp", text(order.customer_whatsapp.as_deref())),
    ("Amount", format_paise(order.amount_paise)),
    ("Currency", text(order.currency.as_deref())),
    ("Description", text(order.description.as_deref())),
    ("Status", status_text(order.status)),
    ("Live status", status_text(order.effective_status())),
    ("Gateway order", text(order.razorpay_order_id.as_deref())),
    ("Payment", text(order.razorpay_payment_id.as_deref())),
    ("Refund", text(order.razorpay_refund_id.as_deref())),
    ("WhatsApp ref", text(order.whatsapp_payment_reference_id.as_deref())),
    (
      "Attempts",
      order.attempt_count.map_or_else(|| NONE.to_string(), |n| n.to_string()),
    ),
    ("Last error", text(order.last_error.as_deref())),
    ("Created", format_time(order.created_at)),
    ("Updated", format_time(order.updated_at)),
    ("Paid", format_time(order.paid_at)),
    ("Failed", format_time(order.failed_at)),
    ("Refunded", format_time(order.refunded_at)),
  ])
}

pub fn status_snapshot(snapshot: &OrderStatusSnapshot) -> String {
  details_table(vec![
    ("Id", snapshot.id.clone()),
    ("Status", status_text(snapshot.status)),
    ("Gateway order", text(snapshot.razorpay_order_id.as_deref())),
    ("Payment", text(snapshot.razorpay_payment_id.as_deref())),
    ("Refund", text(snapshot.razorpay_refund_id.as_deref())),
    (
      "Attempts",
      snapshot.attempt_count.map_or_else(|| NONE.to_string(), |n| n.to_string()),
    ),
    ("Last error", text(snapshot.last_error.as_deref())),
    ("Verified", format_time(snapshot.verified_at)),
    ("Paid", format_time(snapshot.paid_at)),
    ("Failed", format_time(snapshot.failed_at)),
    ("Refunded", format_time(snapshot.refunded_at)),
    ("Updated", format_time(snapshot.updated_at)),
  ])
}

pub fn identity_table(identity: &Identity) -> String {
  details_table(vec![
    ("User", text(Some(&identity.user_id))),
    ("Tenant", text(Some(&identity.tenant_id))),
    ("Role", identity.role.to_string()),
  ])
}

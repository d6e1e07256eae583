// core/src/orders/listing.rs

//! Pure operations over the keyed order collection.

use crate::models::{Order, OrderStatus};
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Rebuilds the collection from a fresh list response.
///
/// Order follows `incoming`. An order that already had a live status keeps it,
/// every other order seeds its live status from the persisted one.
pub fn merge_listing(previous: &IndexMap<String, Order>, incoming: Vec<Order>) -> IndexMap<String, Order> {
  let mut merged = IndexMap::with_capacity(incoming.len());
  for mut order in incoming {
    let remembered = previous.get(&order.id).and_then(|old| old.live_status);
    order.live_status = remembered.or(order.status);
    merged.insert(order.id.clone(), order);
  }
  merged
}

/// Ids of at most `cap` orders whose effective status is not terminal, in
/// collection order. Orders with no status at all count as active.
pub fn select_active(orders: &IndexMap<String, Order>, cap: usize) -> Vec<String> {
  orders
    .values()
    .filter(|order| !order.effective_status().is_some_and(OrderStatus::is_terminal))
    .take(cap)
    .map(|order| order.id.clone())
    .collect()
}

/// Status filter of the order board. `All` is the "ALL" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
  #[default]
  All,
  Only(OrderStatus),
}

impl StatusFilter {
  pub fn accepts(self, status: Option<OrderStatus>) -> bool {
    match self {
      StatusFilter::All => true,
      StatusFilter::Only(wanted) => status == Some(wanted),
    }
  }
}

impl fmt::Display for StatusFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StatusFilter::All => f.write_str("ALL"),
      StatusFilter::Only(status) => status.fmt(f),
    }
  }
}

impl FromStr for StatusFilter {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.trim().eq_ignore_ascii_case("all") {
      return Ok(StatusFilter::All);
    }
    s.parse().map(StatusFilter::Only)
  }
}

fn contains_folded(haystack: Option<&str>, needle: &str) -> bool {
  haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Case-insensitive search over name, WhatsApp number and id, intersected with
/// the status filter. A blank query matches everything.
pub fn filter_orders<'a, I>(orders: I, query: &str, filter: StatusFilter) -> Vec<&'a Order>
where
  I: IntoIterator<Item = &'a Order>,
{
  let needle = query.trim().to_lowercase();
  orders
    .into_iter()
    .filter(|order| {
      let matches_query = needle.is_empty()
        || contains_folded(order.customer_name.as_deref(), &needle)
        || contains_folded(order.customer_whatsapp.as_deref(), &needle)
        || contains_folded(Some(&order.id), &needle);
      matches_query && filter.accepts(order.effective_status())
    })
    .collect()
}

/// `All` followed by each distinct effective status, first seen first.
pub fn status_options<'a, I>(orders: I) -> Vec<StatusFilter>
where
  I: IntoIterator<Item = &'a Order>,
{
  let mut options = vec![StatusFilter::All];
  for status in orders.into_iter().filter_map(Order::effective_status) {
    let option = StatusFilter::Only(status);
    if !options.contains(&option) {
      options.push(option);
    }
  }
  options
}

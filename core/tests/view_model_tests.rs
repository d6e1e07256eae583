// tests/view_model_tests.rs
mod common;

use chatpaykit::models::OrderStatus;
use chatpaykit::{NewOrderForm, OrderListViewModel, StatusFilter};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_load_seeds_live_status_from_persisted_status() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::Created), order("b", OrderStatus::Paid)]);
  let vm = OrderListViewModel::new(api.clone());

  vm.load(false).await;

  let state = vm.snapshot();
  assert!(!state.loading);
  assert!(state.last_error.is_none());
  assert!(state.last_updated_at.is_some());
  assert_eq!(state.orders["a"].live_status, Some(OrderStatus::Created));
  assert_eq!(state.orders["b"].live_status, Some(OrderStatus::Paid));
}

#[tokio::test]
#[serial]
async fn test_reload_keeps_previously_observed_live_status() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::PaymentSent)]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;

  api.set_sync_update(order("a", OrderStatus::Paid));
  vm.reconcile_one("a", true).await;
  assert_eq!(vm.order("a").unwrap().live_status, Some(OrderStatus::Paid));

  // The list endpoint still reports the stale persisted status.
  vm.load(true).await;
  let a = vm.order("a").unwrap();
  assert_eq!(a.status, Some(OrderStatus::PaymentSent));
  assert_eq!(a.live_status, Some(OrderStatus::Paid));
  assert_eq!(a.effective_status(), Some(OrderStatus::Paid));
}

#[tokio::test]
#[serial]
async fn test_visible_load_failure_clears_orders_and_reports_server_message() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::Created)]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;
  assert_eq!(vm.len(), 1);

  api.fail("list", Failure::Server(401, Some("Invalid token")));
  vm.load(false).await;

  assert!(vm.is_empty());
  assert_eq!(vm.last_error().as_deref(), Some("Invalid token"));
  assert!(!vm.is_loading());
}

#[tokio::test]
#[serial]
async fn test_visible_load_failure_without_message_uses_fallback() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![]);
  api.fail("list", Failure::Transport(""));
  let vm = OrderListViewModel::new(api.clone());

  vm.load(false).await;

  assert_eq!(vm.last_error().as_deref(), Some("Failed to load orders"));
}

#[tokio::test]
#[serial]
async fn test_silent_load_failure_leaves_board_alone() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::Created)]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;

  api.fail("list", Failure::Transport("connection refused"));
  vm.load(true).await;

  assert_eq!(vm.len(), 1);
  assert!(vm.last_error().is_none());
}

#[tokio::test]
#[serial]
async fn test_non_list_payload_clears_orders_even_when_silent() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::Created)]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;

  api.fail("list", Failure::Malformed("Backend response is not a list."));
  vm.load(true).await;
  assert!(vm.is_empty());
  assert!(vm.last_error().is_none());

  vm.load(false).await;
  assert_eq!(vm.last_error().as_deref(), Some("Backend response is not a list."));
}

#[tokio::test]
#[serial]
async fn test_reconcile_one_merges_fields_and_reports() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::PaymentSent)]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;

  let mut update = order("a", OrderStatus::Paid);
  update.customer_name = None;
  update.razorpay_payment_id = Some("pay_123".into());
  api.set_sync_update(update);

  vm.reconcile_one("a", false).await;

  let a = vm.order("a").unwrap();
  assert_eq!(a.live_status, Some(OrderStatus::Paid));
  assert_eq!(a.razorpay_payment_id.as_deref(), Some("pay_123"));
  assert_eq!(a.customer_name.as_deref(), Some("Customer a"));
  assert_eq!(vm.last_info().as_deref(), Some("Live status updated"));
  assert!(vm.busy_order_id().is_none());
}

#[tokio::test]
#[serial]
async fn test_reconcile_without_status_keeps_live_status() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::PaymentSent)]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;

  let mut update = order("a", OrderStatus::Paid);
  update.status = None;
  api.set_sync_update(update);
  vm.reconcile_one("a", true).await;

  assert_eq!(vm.order("a").unwrap().live_status, Some(OrderStatus::PaymentSent));
}

#[tokio::test]
#[serial]
async fn test_reconcile_failure_surfaces_only_when_visible() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::PaymentSent)]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;
  api.fail("sync", Failure::Server(502, None));

  vm.reconcile_one("a", true).await;
  assert!(vm.last_error().is_none());

  vm.reconcile_one("a", false).await;
  assert_eq!(vm.last_error().as_deref(), Some("Request failed with status code 502"));
  assert!(vm.busy_order_id().is_none());
}

#[tokio::test]
#[serial]
async fn test_sweep_is_capped_and_skips_terminal_orders() {
  setup_tracing();
  let mut orders = vec![
    order("paid", OrderStatus::Paid),
    order("refunded", OrderStatus::Refunded),
    order("expired", OrderStatus::Expired),
  ];
  for i in 0..12 {
    orders.push(order(&format!("active-{i}"), OrderStatus::PaymentSent));
  }
  let api = FakeApi::with_orders(orders);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;
  api.clear_calls();

  let selected = vm.reconcile_active_sweep().await;

  assert_eq!(selected, 10);
  let calls = api.calls();
  assert_eq!(calls.len(), 10);
  for terminal in ["sync:paid", "sync:refunded", "sync:expired"] {
    assert!(!calls.iter().any(|c| c == terminal));
  }
}

#[tokio::test]
#[serial]
async fn test_sweep_uses_live_status_to_decide_terminal() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::PaymentSent), order("b", OrderStatus::Created)]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;
  api.set_sync_update(order("a", OrderStatus::Paid));
  vm.reconcile_one("a", true).await;
  api.clear_calls();

  vm.reconcile_active_sweep().await;

  assert_eq!(api.calls(), vec!["sync:b".to_string()]);
}

#[tokio::test]
#[serial]
async fn test_sweep_swallows_individual_failures() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![order("a", OrderStatus::Created), order("b", OrderStatus::Failed)]);
  let vm = OrderListViewModel::with_sweep_cap(api.clone(), 10);
  vm.load(false).await;
  api.fail("sync", Failure::Transport("timeout"));

  let selected = vm.reconcile_active_sweep().await;

  assert_eq!(selected, 2);
  assert_eq!(api.count("sync"), 2);
  assert!(vm.last_error().is_none());
  assert_eq!(vm.len(), 2);
}

#[tokio::test]
#[serial]
async fn test_create_order_rejects_bad_input_without_a_request() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![]);
  let vm = OrderListViewModel::new(api.clone());

  let form = NewOrderForm {
    amount_rupees: "abc".into(),
    customer_name: "Asha".into(),
    customer_whatsapp: "9876543210".into(),
    description: String::new(),
  };
  assert!(vm.create_order(&form).await.is_none());
  assert_eq!(vm.last_error().as_deref(), Some("Amount must be a number"));

  let form = NewOrderForm {
    amount_rupees: "500".into(),
    customer_whatsapp: "12345".into(),
    ..form
  };
  assert!(vm.create_order(&form).await.is_none());
  assert_eq!(vm.last_error().as_deref(), Some("WhatsApp must be digits only (10-20)"));

  assert_eq!(api.count("create"), 0);
}

#[tokio::test]
#[serial]
async fn test_create_order_sends_paise_and_reloads() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![]);
  let vm = OrderListViewModel::new(api.clone());

  let form = NewOrderForm {
    amount_rupees: "500.50".into(),
    customer_name: "  Asha ".into(),
    customer_whatsapp: "98765 43210".into(),
    description: "  Saree advance ".into(),
  };
  let created = vm.create_order(&form).await.expect("order should be created");

  let sent = api.created.lock().clone();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].amount_paise, 50050);
  assert_eq!(sent[0].customer_whatsapp, "9876543210");
  assert_eq!(sent[0].description.as_deref(), Some("Saree advance"));

  assert_eq!(api.calls(), vec!["create".to_string(), "list".to_string()]);
  assert!(vm.order(&created.id).is_some());
  assert_eq!(vm.last_info().as_deref(), Some("Order created"));
}

#[tokio::test]
#[serial]
async fn test_create_order_server_rejection_uses_message() {
  setup_tracing();
  let api = FakeApi::with_orders(vec![]);
  api.fail("create", Failure::Server(400, Some("Tenant settings missing")));
  let vm = OrderListViewModel::new(api.clone());

  let form = NewOrderForm {
    customer_name: "Asha".into(),
    customer_whatsapp: "9876543210".into(),
    ..NewOrderForm::default()
  };
  assert!(vm.create_order(&form).await.is_none());
  assert_eq!(vm.last_error().as_deref(), Some("Tenant settings missing"));
}

#[tokio::test]
#[serial]
async fn test_derived_views_follow_effective_status() {
  setup_tracing();
  let mut asha = order("ord-1", OrderStatus::PaymentSent);
  asha.customer_name = Some("Asha".into());
  let mut ravi = order("ord-2", OrderStatus::Created);
  ravi.customer_name = Some("Ravi".into());
  let api = FakeApi::with_orders(vec![asha, ravi]);
  let vm = OrderListViewModel::new(api.clone());
  vm.load(false).await;

  api.set_sync_update(order("ord-1", OrderStatus::Paid));
  vm.reconcile_one("ord-1", true).await;

  assert_eq!(
    vm.status_options(),
    vec![
      StatusFilter::All,
      StatusFilter::Only(OrderStatus::Paid),
      StatusFilter::Only(OrderStatus::Created)
    ]
  );
  let paid = vm.filtered_orders("", StatusFilter::Only(OrderStatus::Paid));
  assert_eq!(paid.len(), 1);
  assert_eq!(paid[0].id, "ord-1");
  assert!(vm
    .filtered_orders("ravi", StatusFilter::Only(OrderStatus::PaymentSent))
    .is_empty());
  assert_eq!(vm.filtered_orders("ORD-", StatusFilter::All).len(), 2);
}

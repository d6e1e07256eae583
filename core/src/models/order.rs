// core/src/models/order.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order as reported by the server.
///
/// The server owns the state machine; nothing here validates transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Created,
  PaymentSent,
  Paid,
  Failed,
  Expired,
  RefundPending,
  Refunded,
  #[serde(other)]
  Unknown,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 7] = [
    OrderStatus::Created,
    OrderStatus::PaymentSent,
    OrderStatus::Paid,
    OrderStatus::Failed,
    OrderStatus::Expired,
    OrderStatus::RefundPending,
    OrderStatus::Refunded,
  ];

  /// PAID, REFUNDED and EXPIRED: no further transition is expected, so the
  /// background sweep leaves these orders alone.
  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Paid | OrderStatus::Refunded | OrderStatus::Expired)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Created => "CREATED",
      OrderStatus::PaymentSent => "PAYMENT_SENT",
      OrderStatus::Paid => "PAID",
      OrderStatus::Failed => "FAILED",
      OrderStatus::Expired => "EXPIRED",
      OrderStatus::RefundPending => "REFUND_PENDING",
      OrderStatus::Refunded => "REFUNDED",
      OrderStatus::Unknown => "UNKNOWN",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().replace('-', "_").to_ascii_uppercase();
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == wanted)
      .ok_or_else(|| format!("unknown order status '{s}'"))
  }
}

/// A single payment request.
///
/// `live_status` never travels over the wire. It holds the last status seen
/// from a reconciliation call and falls back to `status` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: String,
  pub customer_name: Option<String>,
  pub customer_whatsapp: Option<String>,
  pub amount_paise: Option<i64>,
  pub currency: Option<String>,
  pub description: Option<String>,
  pub status: Option<OrderStatus>,
  #[serde(skip)]
  pub live_status: Option<OrderStatus>,

  pub razorpay_order_id: Option<String>,
  pub razorpay_payment_id: Option<String>,
  pub razorpay_refund_id: Option<String>,

  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  pub verified_at: Option<DateTime<Utc>>,
  pub paid_at: Option<DateTime<Utc>>,
  pub failed_at: Option<DateTime<Utc>>,
  pub refunded_at: Option<DateTime<Utc>>,

  pub attempt_count: Option<i32>,
  pub last_error: Option<String>,
  pub whatsapp_payment_reference_id: Option<String>,
}

impl Order {
  /// `live_status ?? status`.
  pub fn effective_status(&self) -> Option<OrderStatus> {
    self.live_status.or(self.status)
  }

  /// True once the payment flow has created a gateway-side order.
  pub fn has_gateway_order(&self) -> bool {
    self
      .razorpay_order_id
      .as_deref()
      .is_some_and(|id| !id.trim().is_empty())
  }

  /// Folds a reconciliation response into this order.
  ///
  /// Fields present in `update` overwrite, absent ones are kept. The live
  /// status follows the returned status and is left alone when the response
  /// carries none.
  pub fn absorb(&mut self, update: Order) {
    fn take<T>(slot: &mut Option<T>, incoming: Option<T>) {
      if incoming.is_some() {
        *slot = incoming;
      }
    }

    self.live_status = update.status.or(self.live_status);
    take(&mut self.customer_name, update.customer_name);
    take(&mut self.customer_whatsapp, update.customer_whatsapp);
    take(&mut self.amount_paise, update.amount_paise);
    take(&mut self.currency, update.currency);
    take(&mut self.description, update.description);
    take(&mut self.status, update.status);
    take(&mut self.razorpay_order_id, update.razorpay_order_id);
    take(&mut self.razorpay_payment_id, update.razorpay_payment_id);
    take(&mut self.razorpay_refund_id, update.razorpay_refund_id);
    take(&mut self.created_at, update.created_at);
    take(&mut self.updated_at, update.updated_at);
    take(&mut self.verified_at, update.verified_at);
    take(&mut self.paid_at, update.paid_at);
    take(&mut self.failed_at, update.failed_at);
    take(&mut self.refunded_at, update.refunded_at);
    take(&mut self.attempt_count, update.attempt_count);
    take(&mut self.last_error, update.last_error);
    take(&mut self.whatsapp_payment_reference_id, update.whatsapp_payment_reference_id);
  }
}

/// Body of `GET /api/orders/{id}/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusSnapshot {
  pub id: String,
  pub status: Option<OrderStatus>,
  pub razorpay_order_id: Option<String>,
  pub razorpay_payment_id: Option<String>,
  pub razorpay_refund_id: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  pub verified_at: Option<DateTime<Utc>>,
  pub paid_at: Option<DateTime<Utc>>,
  pub failed_at: Option<DateTime<Utc>>,
  pub refunded_at: Option<DateTime<Utc>>,
  pub attempt_count: Option<i32>,
  pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_server_order_and_ignores_unknown_fields() {
    let raw = r#"{
      "id": "7f0c",
      "customerName": "Asha",
      "customerWhatsapp": "919876543210",
      "amountPaise": 50050,
      "status": "PAYMENT_SENT",
      "razorpayOrderId": "order_Nx12",
      "createdAt": "2024-05-01T10:15:30.123Z",
      "tenantId": "t-1"
    }"#;
    let order: Order = serde_json::from_str(raw).unwrap();
    assert_eq!(order.status, Some(OrderStatus::PaymentSent));
    assert_eq!(order.amount_paise, Some(50050));
    assert!(order.live_status.is_none());
    assert!(order.has_gateway_order());
  }

  #[test]
  fn unrecognised_status_does_not_fail_decoding() {
    let order: Order = serde_json::from_str(r#"{"id":"a","status":"ON_HOLD"}"#).unwrap();
    assert_eq!(order.status, Some(OrderStatus::Unknown));
  }

  #[test]
  fn absorb_keeps_live_status_when_response_has_none() {
    let mut order = Order {
      id: "a".into(),
      status: Some(OrderStatus::Created),
      live_status: Some(OrderStatus::PaymentSent),
      ..Default::default()
    };
    order.absorb(Order {
      id: "a".into(),
      razorpay_payment_id: Some("pay_1".into()),
      ..Default::default()
    });
    assert_eq!(order.live_status, Some(OrderStatus::PaymentSent));
    assert_eq!(order.razorpay_payment_id.as_deref(), Some("pay_1"));

    order.absorb(Order {
      id: "a".into(),
      status: Some(OrderStatus::Paid),
      ..Default::default()
    });
    assert_eq!(order.live_status, Some(OrderStatus::Paid));
    assert_eq!(order.effective_status(), Some(OrderStatus::Paid));
  }

  #[test]
  fn status_parses_loosely_from_cli_input() {
    assert_eq!("payment-sent".parse::<OrderStatus>(), Ok(OrderStatus::PaymentSent));
    assert_eq!("PAID".parse::<OrderStatus>(), Ok(OrderStatus::Paid));
    assert!("bogus".parse::<OrderStatus>().is_err());
  }
}

// core/src/orders/form.rs

//! The create-order form and its local validation.

use crate::error::PayKitError;
use crate::models::CreateOrderRequest;
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_AMOUNT_RUPEES: &str = "500";
pub const MIN_AMOUNT_PAISE: i64 = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

static WHATSAPP_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10,20}$").expect("static regex"));

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderForm {
  pub amount_rupees: String,
  pub customer_name: String,
  pub customer_whatsapp: String,
  pub description: String,
}

impl Default for NewOrderForm {
  fn default() -> Self {
    Self {
      amount_rupees: DEFAULT_AMOUNT_RUPEES.to_string(),
      customer_name: String::new(),
      customer_whatsapp: String::new(),
      description: String::new(),
    }
  }
}

/// Converts a rupee string to paise, rounding to the nearest paisa.
///
/// A blank string is zero. Anything that is not a finite number is `None`.
pub fn rupees_to_paise(raw: &str) -> Option<i64> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Some(0);
  }
  let rupees: f64 = trimmed.parse().ok()?;
  if !rupees.is_finite() {
    return None;
  }
  let paise = (rupees * 100.0).round();
  if paise.abs() >= i64::MAX as f64 {
    return None;
  }
  Some(paise as i64)
}

impl NewOrderForm {
  /// Validates the form into a request body. Nothing is sent when this fails.
  pub fn validate(&self) -> Result<CreateOrderRequest, PayKitError> {
    let amount_paise = rupees_to_paise(&self.amount_rupees)
      .ok_or_else(|| PayKitError::Validation("Amount must be a number".to_string()))?;
    if amount_paise < MIN_AMOUNT_PAISE {
      return Err(PayKitError::Validation("Amount must be at least ₹1".to_string()));
    }

    let whatsapp: String = self.customer_whatsapp.chars().filter(|c| !c.is_whitespace()).collect();
    if !WHATSAPP_DIGITS.is_match(&whatsapp) {
      return Err(PayKitError::Validation("WhatsApp must be digits only (10-20)".to_string()));
    }

    let customer_name = self.customer_name.trim();
    if customer_name.is_empty() {
      return Err(PayKitError::Validation("Customer name is required".to_string()));
    }

    let description = self.description.trim();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
      return Err(PayKitError::Validation(format!(
        "Description must be at most {MAX_DESCRIPTION_CHARS} characters"
      )));
    }

    Ok(CreateOrderRequest {
      customer_name: customer_name.to_string(),
      customer_whatsapp: whatsapp,
      amount_paise,
      description: (!description.is_empty()).then(|| description.to_string()),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(amount: &str, whatsapp: &str) -> NewOrderForm {
    NewOrderForm {
      amount_rupees: amount.to_string(),
      customer_name: " Asha ".to_string(),
      customer_whatsapp: whatsapp.to_string(),
      description: String::new(),
    }
  }

  #[test]
  fn amounts_convert_to_paise() {
    assert_eq!(rupees_to_paise("500"), Some(50000));
    assert_eq!(rupees_to_paise("500.50"), Some(50050));
    assert_eq!(rupees_to_paise("0.015"), Some(2));
    assert_eq!(rupees_to_paise(""), Some(0));
    assert_eq!(rupees_to_paise("abc"), None);
    assert_eq!(rupees_to_paise("inf"), None);
  }

  #[test]
  fn valid_form_builds_request() {
    let request = form("500.50", "98765 43210").validate().unwrap();
    assert_eq!(request.amount_paise, 50050);
    assert_eq!(request.customer_whatsapp, "9876543210");
    assert_eq!(request.customer_name, "Asha");
    assert_eq!(request.description, None);
  }

  #[test]
  fn rejects_bad_amounts() {
    let err = form("abc", "9876543210").validate().unwrap_err();
    assert_eq!(err.user_message("Create failed"), "Amount must be a number");
    let err = form("0.99", "9876543210").validate().unwrap_err();
    assert_eq!(err.user_message("Create failed"), "Amount must be at least ₹1");
    assert!(form("", "9876543210").validate().is_err());
  }

  #[test]
  fn rejects_short_or_non_numeric_whatsapp() {
    assert!(form("500", "12345").validate().is_err());
    assert!(form("500", "+919876543210").validate().is_err());
    assert!(form("500", "9876543210").validate().is_ok());
  }

  #[test]
  fn rejects_blank_name_and_long_description() {
    let mut blank = form("500", "9876543210");
    blank.customer_name = "   ".into();
    assert!(blank.validate().is_err());

    let mut wordy = form("500", "9876543210");
    wordy.description = "x".repeat(501);
    assert!(wordy.validate().is_err());
    wordy.description = format!("  {}  ", "x".repeat(500));
    assert_eq!(wordy.validate().unwrap().description.map(|d| d.len()), Some(500));
  }
}

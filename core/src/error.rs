// core/src/error.rs
use thiserror::Error;

/// Failures raised by the step pipeline engine itself, as opposed to the
/// handlers it runs.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Error in step handler. Source: {source}")]
  HandlerError {
    #[source]
    source: anyhow::Error,
  },
}

impl From<anyhow::Error> for FlowError {
  fn from(err: anyhow::Error) -> Self {
    FlowError::HandlerError { source: err }
  }
}

/// Every failure the console can surface to a user.
///
/// Nothing here is retried or escalated; callers turn an error into a single
/// display string with [`PayKitError::user_message`].
#[derive(Debug, Error)]
pub enum PayKitError {
  /// The request never produced an HTTP response (DNS, connect, TLS, body read).
  #[error("Transport error: {message}")]
  Transport { message: String },

  /// The server answered with a non-success status.
  #[error("Server rejected request (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
  Server { status: u16, message: Option<String> },

  /// The server answered successfully but the body was not what the endpoint promises.
  #[error("Unexpected response payload: {0}")]
  MalformedPayload(String),

  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Not authenticated: {0}")]
  MissingToken(String),

  #[error("Session storage error: {0}")]
  Storage(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Workflow error: {source}")]
  Flow {
    #[from]
    source: FlowError,
  },
}

impl PayKitError {
  /// Picks the message shown to the user: the server-supplied message when
  /// there is one, then the transport-level message, then `fallback`.
  pub fn user_message(&self, fallback: &str) -> String {
    let candidate = match self {
      PayKitError::Server {
        message: Some(message), ..
      } => message.clone(),
      PayKitError::Server { status, message: None } => format!("Request failed with status code {status}"),
      PayKitError::Transport { message } => message.clone(),
      PayKitError::MalformedPayload(message)
      | PayKitError::Validation(message)
      | PayKitError::MissingToken(message)
      | PayKitError::Storage(message)
      | PayKitError::Config(message) => message.clone(),
      PayKitError::Flow { .. } => String::new(),
    };
    if candidate.trim().is_empty() {
      fallback.to_string()
    } else {
      candidate
    }
  }
}

impl From<reqwest::Error> for PayKitError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      return PayKitError::MalformedPayload(err.to_string());
    }
    PayKitError::Transport {
      message: err.to_string(),
    }
  }
}

pub type PayKitResult<T, E = PayKitError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn server_message_wins_over_fallback() {
    let err = PayKitError::Server {
      status: 400,
      message: Some("Call send-payment first".to_string()),
    };
    assert_eq!(err.user_message("Checkout failed"), "Call send-payment first");
  }

  #[test]
  fn status_only_server_error_reads_like_a_transport_message() {
    let err = PayKitError::Server {
      status: 502,
      message: None,
    };
    assert_eq!(err.user_message("Sync failed"), "Request failed with status code 502");
  }

  #[test]
  fn blank_messages_fall_back() {
    let err = PayKitError::Transport { message: "  ".into() };
    assert_eq!(err.user_message("Action failed"), "Action failed");

    let flow = PayKitError::from(FlowError::HandlerMissing {
      step_name: "perform_request".into(),
    });
    assert_eq!(flow.user_message("Action failed"), "Action failed");
  }
}

// console/src/cli.rs
use chatpaykit::config::parse_api_base;
use chatpaykit::{ClientConfig, OrderAction, StatusFilter};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::commands::{auth, orders, settings};
use crate::state::ConsoleState;

#[derive(Debug, Parser)]
#[command(name = "chatpaykit-console", about = "ChatPayKit order and payment console", long_about = None)]
pub struct Cli {
  /// Base address of the ChatPayKit API
  #[arg(long, global = true, env = "CHATPAYKIT_API_BASE")]
  api_base: Option<String>,

  /// Where the session token is kept between runs
  #[arg(long, global = true, env = "CHATPAYKIT_SESSION_FILE")]
  session_file: Option<PathBuf>,

  /// Debug logging with span timings on stderr
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Emit logs as JSON lines
  #[arg(long, global = true)]
  pub log_json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Create a tenant and its first admin, then log in
  Signup(auth::SignupArgs),
  /// Log in and keep the token for later commands
  Login(auth::LoginArgs),
  /// Forget the stored session
  Logout,
  /// Show the identity decoded from the stored token
  Whoami,
  /// List orders
  Orders(orders::ListArgs),
  /// Show one order
  Show(OrderIdArg),
  /// Show the server's status snapshot of one order
  Status(OrderIdArg),
  /// Create an order
  Create(orders::CreateArgs),
  /// Reconcile one order with the payment gateway
  Sync(OrderIdArg),
  /// Send the payment request to the customer
  SendPayment(ActionArgs),
  /// Open the hosted checkout page for an order
  Checkout(ActionArgs),
  /// Retry a failed payment
  Retry(ActionArgs),
  /// Refund a paid order
  Refund(ActionArgs),
  /// Keep the board live until Ctrl-C
  Watch(orders::WatchArgs),
  /// Save the tenant's gateway and WhatsApp credentials (admin only)
  Settings(settings::SettingsArgs),
}

#[derive(Debug, Args)]
pub struct OrderIdArg {
  /// Order id
  pub id: String,
}

#[derive(Debug, Args)]
pub struct ActionArgs {
  /// Order id
  pub id: String,

  /// Run even when the order's status does not allow the action
  #[arg(long)]
  pub force: bool,
}

/// Accepts `ALL` or any order status, case-insensitively.
pub fn parse_status_filter(raw: &str) -> Result<StatusFilter, String> {
  raw.parse()
}

pub fn parse_millis(raw: &str) -> Result<Duration, String> {
  match raw.trim().parse::<u64>() {
    Ok(0) => Err("interval must be greater than zero".to_string()),
    Ok(ms) => Ok(Duration::from_millis(ms)),
    Err(e) => Err(format!("invalid millisecond count: {e}")),
  }
}

impl Cli {
  fn config(&self) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(raw) = self.api_base.as_deref().filter(|raw| !raw.trim().is_empty()) {
      config.api_base = parse_api_base(raw)?;
    }
    if let Some(path) = &self.session_file {
      config.session_file = path.clone();
    }
    Ok(config)
  }

  pub async fn run(self) -> anyhow::Result<()> {
    let state = ConsoleState::new(self.config()?);
    match self.command {
      Command::Signup(args) => auth::signup(&state, args).await,
      Command::Login(args) => auth::login(&state, args).await,
      Command::Logout => auth::logout(&state),
      Command::Whoami => auth::whoami(&state),
      Command::Orders(args) => orders::list(&state, args).await,
      Command::Show(arg) => orders::show(&state, &arg.id).await,
      Command::Status(arg) => orders::status(&state, &arg.id).await,
      Command::Create(args) => orders::create(&state, args).await,
      Command::Sync(arg) => orders::sync(&state, &arg.id).await,
      Command::SendPayment(args) => orders::act(&state, OrderAction::SendPayment, args).await,
      Command::Checkout(args) => orders::act(&state, OrderAction::Checkout, args).await,
      Command::Retry(args) => orders::act(&state, OrderAction::Retry, args).await,
      Command::Refund(args) => orders::act(&state, OrderAction::Refund, args).await,
      Command::Watch(args) => orders::watch(&state, args).await,
      Command::Settings(args) => settings::save(&state, args).await,
    }
  }
}

// console/src/commands/auth.rs
use anyhow::bail;
use chatpaykit::auth::{LOGIN_FALLBACK, SIGNUP_FALLBACK};
use chatpaykit::Identity;
use clap::Args;
use tracing::instrument;

use crate::render;
use crate::state::ConsoleState;

#[derive(Debug, Args)]
pub struct LoginArgs {
  #[arg(long, env = "CHATPAYKIT_EMAIL")]
  email: String,

  #[arg(long, env = "CHATPAYKIT_PASSWORD", hide_env_values = true)]
  password: String,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
  /// Business name shown to customers
  #[arg(long)]
  tenant_name: String,

  #[arg(long, env = "CHATPAYKIT_EMAIL")]
  email: String,

  #[arg(long, env = "CHATPAYKIT_PASSWORD", hide_env_values = true)]
  password: String,
}

fn signed_in(headline: &str, identity: Option<Identity>) {
  println!("{headline}");
  match identity {
    Some(identity) => println!("{}", render::identity_table(&identity)),
    None => println!("The token carries no readable identity; some views may be unavailable."),
  }
}

#[instrument(skip_all)]
pub async fn login(state: &ConsoleState, args: LoginArgs) -> anyhow::Result<()> {
  match state.authenticator().login(&args.email, &args.password).await {
    Ok(identity) => {
      signed_in("Logged in.", identity);
      Ok(())
    }
    Err(err) => bail!("{}", err.user_message(LOGIN_FALLBACK)),
  }
}

#[instrument(skip_all)]
pub async fn signup(state: &ConsoleState, args: SignupArgs) -> anyhow::Result<()> {
  match state
    .authenticator()
    .signup(&args.tenant_name, &args.email, &args.password)
    .await
  {
    Ok(identity) => {
      signed_in("Tenant created and logged in.", identity);
      Ok(())
    }
    Err(err) => bail!("{}", err.user_message(SIGNUP_FALLBACK)),
  }
}

pub fn logout(state: &ConsoleState) -> anyhow::Result<()> {
  state.tokens.logout()?;
  println!("Logged out.");
  Ok(())
}

pub fn whoami(state: &ConsoleState) -> anyhow::Result<()> {
  if state.tokens.token().is_none() {
    bail!("Not logged in.");
  }
  match state.tokens.user() {
    Some(identity) => println!("{}", render::identity_table(&identity)),
    None => println!("Logged in, but the stored token carries no readable identity."),
  }
  Ok(())
}

//! One handler per subcommand.

mod auth;
mod billing;
mod projects;

use saasprobe_client::ApiError;

use crate::app::App;
use crate::cli::{BillingCommand, Command};
use crate::feedback::{CliError, CliResult};

pub async fn run(app: &mut App, command: Command) -> CliResult<()> {
    match command {
        Command::Register { email, full_name } => auth::register(app, email, full_name).await,
        Command::Login { email } => auth::login(app, email).await,
        Command::Logout => auth::logout(app),
        Command::Whoami => auth::whoami(app).await,
        Command::Projects { command } => projects::run(app, command).await,
        Command::Billing { command: None } => billing::show(app).await,
        Command::Billing {
            command: Some(BillingCommand::Cancel { yes }),
        } => billing::cancel(app, yes).await,
        Command::Plans => {
            billing::plans(app);
            Ok(())
        }
        Command::Checkout { plan, no_browser } => billing::checkout(app, plan, no_browser).await,
    }
}

/// Banner text for a failed initial load.
///
/// A rejected session is never rendered inline; it ends the command with
/// the login redirect instead.
fn load_banner(err: ApiError, what: &str) -> CliResult<String> {
    match err {
        ApiError::Unauthorized => Err(CliError::SessionExpired),
        other => {
            tracing::debug!(error = %other, "Initial load failed");
            let reason = other
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string());
            Ok(format!("Failed to load {what}: {reason}"))
        }
    }
}

use colored::Colorize;
use saasprobe_client::ApiError;
use saasprobe_core::format::format_date;
use saasprobe_core::user::{LoginCredentials, RegisterData};

use crate::app::App;
use crate::feedback::{self, CliError, CliResult};

pub(super) async fn register(
    app: &mut App,
    email: Option<String>,
    full_name: Option<String>,
) -> CliResult<()> {
    let email = app.input.value_or_prompt(email, "Email").await?;
    let full_name = match full_name {
        Some(name) => name,
        None => app.input.prompt("Full name (optional)").await?,
    };
    let password = app.input.prompt("Password (min 8 characters)").await?;

    let data = RegisterData {
        email: email.trim().to_string(),
        password,
        full_name: Some(full_name.trim().to_string()).filter(|n| !n.is_empty()),
    };

    let user = app
        .api
        .register_and_login(&data)
        .await
        .map_err(CliError::action("create account"))?;

    println!(
        "{}",
        feedback::success(&format!("Welcome, {}! You are signed in.", user.display_name()))
    );
    println!("Create your first project with `saasprobe projects new`.");
    Ok(())
}

pub(super) async fn login(app: &mut App, email: Option<String>) -> CliResult<()> {
    let email = app.input.value_or_prompt(email, "Email").await?;
    let password = app.input.prompt("Password").await?;

    let credentials = LoginCredentials {
        email: email.trim().to_string(),
        password,
    };
    match app.api.login(&credentials).await {
        Ok(_) => {}
        Err(ApiError::Unauthorized) => {
            return Err(CliError::Invalid("Incorrect email or password".into()));
        }
        Err(e) => return Err(CliError::action("log in")(e)),
    }

    let user = app.api.current_user().await?;
    println!(
        "{}",
        feedback::success(&format!("Signed in as {}", user.display_name()))
    );
    Ok(())
}

pub(super) fn logout(app: &App) -> CliResult<()> {
    app.api.logout()?;
    println!("{}", feedback::success("Signed out."));
    println!("Log in again with `saasprobe login`.");
    Ok(())
}

pub(super) async fn whoami(app: &App) -> CliResult<()> {
    app.require_session()?;
    let Some(user) = app.api.restore_session().await? else {
        return Err(CliError::SessionExpired);
    };

    println!("{}", user.display_name().bold());
    if user.display_name() != user.email {
        println!("{}", user.email);
    }
    println!("Tier: {}", user.subscription_tier.as_str());
    println!("{}", format!("Member since {}", format_date(&user.created_at)).dimmed());
    Ok(())
}

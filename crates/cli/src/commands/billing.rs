use colored::Colorize;
use saasprobe_core::plans::{offer_for, PLAN_CATALOG};
use saasprobe_core::subscription::Plan;

use super::load_banner;
use crate::app::App;
use crate::feedback::{self, CliError, CliResult};
use crate::views::{billing, pricing};

pub(super) async fn show(app: &App) -> CliResult<()> {
    app.require_session()?;
    match app.api.get_subscription().await {
        Ok(subscription) => {
            print!("{}", billing::render(Some(&subscription), None));
            Ok(())
        }
        Err(e) => {
            let banner = load_banner(e, "subscription")?;
            print!("{}", billing::render(None, Some(&banner)));
            Err(CliError::Reported(banner))
        }
    }
}

pub(super) async fn cancel(app: &mut App, yes: bool) -> CliResult<()> {
    app.require_session()?;
    let question = "Are you sure you want to cancel your subscription? \
                    You will retain access until the end of your billing period.";
    if !yes && !app.input.confirm(question).await? {
        println!("Subscription unchanged.");
        return Ok(());
    }

    let result = app
        .api
        .cancel_subscription()
        .await
        .map_err(CliError::action("cancel subscription"))?;
    tracing::debug!(status = %result.status, "Cancellation accepted");

    println!("{}", feedback::success("Subscription cancelled successfully"));
    println!();
    show(app).await
}

pub(super) fn plans(app: &App) {
    let signed_in = app.api.auth().token().is_some();
    print!("{}", pricing::render(PLAN_CATALOG, signed_in));
}

/// Create a hosted checkout session and hand it to the browser.
///
/// Without a session the user is sent to registration first.
pub(super) async fn checkout(app: &App, plan: Plan, no_browser: bool) -> CliResult<()> {
    app.require_session()?;

    let session = app
        .api
        .create_checkout_session(plan)
        .await
        .map_err(CliError::action("start checkout"))?;

    let price = offer_for(plan)
        .map(|offer| format!(" (${}/month)", offer.price_usd))
        .unwrap_or_default();
    println!(
        "Checkout for the {} plan{price}: {}",
        plan.display_name().bold(),
        session.checkout_url.underline()
    );
    if no_browser {
        return Ok(());
    }
    if let Err(e) = open::that(&session.checkout_url) {
        tracing::warn!(error = %e, "Could not open a browser");
        println!("Open the link above in your browser to finish subscribing.");
    }
    Ok(())
}

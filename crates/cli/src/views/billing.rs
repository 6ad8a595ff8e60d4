use std::fmt::Write;

use colored::Colorize;
use saasprobe_core::subscription::{Subscription, SubscriptionStatus, UsageMeter};

use super::{push_banner, subscription_badge};

/// Width of the usage bar in cells.
const METER_WIDTH: usize = 30;

/// Billing screen. `None` renders as the free plan.
pub fn render(subscription: Option<&Subscription>, banner: Option<&str>) -> String {
    let mut out = String::new();
    push_banner(&mut out, banner);

    let _ = writeln!(out, "{}", "Billing & Subscription".bold());
    out.push('\n');

    match subscription.filter(|s| !s.is_free()) {
        None => {
            let _ = writeln!(
                out,
                "{}  {}",
                "Free Plan".bold(),
                subscription_badge(&SubscriptionStatus::None)
            );
            let _ = writeln!(
                out,
                "You're currently on the free plan. Upgrade to unlock more validations and features."
            );
        }
        Some(sub) => render_paid(&mut out, sub),
    }

    if subscription.map_or(true, Subscription::should_offer_upgrade) {
        out.push('\n');
        let _ = writeln!(out, "{}", "Unlock More Features".bold());
        let _ = writeln!(
            out,
            "Upgrade to get more validations, priority support, and advanced features."
        );
        let _ = writeln!(out, "See `saasprobe plans`, then `saasprobe checkout <plan>`.");
    }

    out
}

fn render_paid(out: &mut String, sub: &Subscription) {
    let plan = sub.plan.map_or("Unknown", |p| p.display_name());
    let _ = writeln!(
        out,
        "{}  {}",
        format!("{plan} Plan").bold(),
        subscription_badge(&sub.status)
    );

    out.push('\n');
    let usage = sub.usage();
    let _ = writeln!(out, "Validations Used  {usage}");
    if let Some(bar) = meter_bar(&usage) {
        let _ = writeln!(out, "{bar}");
    }

    if let Some(line) = sub.period_end_line() {
        let _ = writeln!(out, "{}", line.dimmed());
    }

    match &sub.status {
        SubscriptionStatus::Active => {
            let _ = writeln!(out, "\nCancel with `saasprobe billing cancel`.");
        }
        SubscriptionStatus::PastDue => {
            out.push('\n');
            let _ = writeln!(out, "{}", "⚠️ Payment Failed".yellow().bold());
            let _ = writeln!(
                out,
                "We couldn't process your payment. Please update your payment method to continue using the service."
            );
        }
        SubscriptionStatus::Cancelled => {
            out.push('\n');
            let _ = writeln!(out, "{}", "Subscription Cancelled".red().bold());
            let _ = writeln!(
                out,
                "Your subscription has been cancelled. You'll have access until the end of your billing period."
            );
            let _ = writeln!(out, "Reactivate with `saasprobe checkout <plan>`.");
        }
        SubscriptionStatus::None | SubscriptionStatus::Other(_) => {}
    }
}

/// `[#########.....] 42%`, or `None` for an unlimited plan.
pub fn meter_bar(usage: &UsageMeter) -> Option<String> {
    let percent = usage.percent()?;
    let filled = (usize::from(percent) * METER_WIDTH + 50) / 100;
    Some(format!(
        "[{}{}] {percent}%",
        "#".repeat(filled).green(),
        ".".repeat(METER_WIDTH - filled).dimmed()
    ))
}

//! Screen renderers.
//!
//! Every view is a pure function from data to a `String`; commands decide
//! when to print. Colors come from [`colored`], which honours `NO_COLOR`
//! and `CLICOLOR`.

pub mod billing;
pub mod dashboard;
pub mod pricing;
pub mod project;

use colored::{ColoredString, Colorize};
use saasprobe_core::analysis::ScoreTier;
use saasprobe_core::project::ProjectStatus;
use saasprobe_core::subscription::SubscriptionStatus;

pub(crate) fn status_badge(status: ProjectStatus) -> ColoredString {
    let text = format!("[{}]", status.label());
    match status {
        ProjectStatus::Pending => text.yellow(),
        ProjectStatus::Processing => text.blue(),
        ProjectStatus::Completed => text.green(),
        ProjectStatus::Failed => text.red(),
    }
}

pub(crate) fn subscription_badge(status: &SubscriptionStatus) -> ColoredString {
    let text = format!("[{}]", status.label());
    match status {
        SubscriptionStatus::Active => text.green(),
        SubscriptionStatus::PastDue => text.yellow(),
        SubscriptionStatus::Cancelled => text.red(),
        SubscriptionStatus::None | SubscriptionStatus::Other(_) => text.dimmed(),
    }
}

pub(crate) fn tier_colored(tier: ScoreTier, text: String) -> ColoredString {
    match tier {
        ScoreTier::Good => text.green(),
        ScoreTier::Warning => text.yellow(),
        ScoreTier::Poor => text.red(),
    }
}

/// Append `banner` as the first line when present.
pub(crate) fn push_banner(out: &mut String, banner: Option<&str>) {
    if let Some(message) = banner {
        out.push_str(&crate::feedback::banner(message));
        out.push_str("\n\n");
    }
}

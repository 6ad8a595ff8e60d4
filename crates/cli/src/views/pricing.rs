use std::fmt::Write;

use colored::Colorize;
use saasprobe_core::plans::PlanOffer;

/// Pricing table. `signed_in` picks the call to action.
pub fn render(offers: &[PlanOffer], signed_in: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Simple, Transparent Pricing".bold());
    let _ = writeln!(
        out,
        "Choose the plan that fits your validation needs. All plans include core features."
    );

    for offer in offers {
        out.push('\n');
        let mut title = format!("{}  ${}/month", offer.plan.display_name(), offer.price_usd)
            .bold()
            .to_string();
        if offer.popular {
            let _ = write!(title, "  {}", "★ Most Popular".magenta().bold());
        }
        let _ = writeln!(out, "{title}");

        let validations = match offer.validations {
            Some(_) => format!("{} validations/mo", offer.validations_label()),
            None => offer.validations_label(),
        };
        let _ = writeln!(out, "  {}", validations.dimmed());
        for feature in offer.features {
            let _ = writeln!(out, "  {} {feature}", "✓".green());
        }
        let _ = writeln!(
            out,
            "  → saasprobe checkout {}",
            offer.plan.as_str()
        );
    }

    if !signed_in {
        let _ = writeln!(
            out,
            "\nNew here? Create an account with `saasprobe register` to get started."
        );
    }

    out
}

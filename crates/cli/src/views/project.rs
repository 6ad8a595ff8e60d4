use std::fmt::Write;

use colored::Colorize;
use saasprobe_core::analysis::{Analysis, Platform};
use saasprobe_core::project::{ProjectStatus, ProjectWithAnalysis};

use super::{push_banner, status_badge, tier_colored};

/// Single project screen.
///
/// The result blocks only render for a `completed` project; an analysis
/// attached in any other state is ignored.
pub fn render(detail: &ProjectWithAnalysis, banner: Option<&str>) -> String {
    let project = &detail.project;
    let mut out = String::new();
    push_banner(&mut out, banner);

    let _ = writeln!(
        out,
        "{}  {}",
        project.name.bold(),
        status_badge(project.status)
    );
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "{}", description.dimmed());
    }
    out.push('\n');

    match project.status {
        ProjectStatus::Pending => {
            let _ = writeln!(out, "{}", "⏳ Queued".yellow().bold());
            let _ = writeln!(out, "Your validation has been queued and will start shortly...");
        }
        ProjectStatus::Processing => {
            let platforms: Vec<&str> = Platform::ALL.iter().map(Platform::label).collect();
            let _ = writeln!(out, "{}", "🔄 Processing".blue().bold());
            let _ = writeln!(
                out,
                "We're analyzing {}. This usually takes 2-5 minutes...",
                join_with_and(&platforms)
            );
        }
        ProjectStatus::Failed => {
            let _ = writeln!(out, "{}", "❌ Failed".red().bold());
            let _ = writeln!(
                out,
                "Validation failed. This could be due to API limits or temporary issues."
            );
        }
        ProjectStatus::Completed => {}
    }

    if let Some(analysis) = detail.completed_analysis() {
        render_analysis(&mut out, analysis);
    }

    let keywords = project.keywords();
    if !keywords.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "{}", "Keywords".bold());
        let _ = writeln!(out, "{}", keywords.join(", ").cyan());
    }

    out
}

fn render_analysis(out: &mut String, analysis: &Analysis) {
    let tier = analysis.tier();
    let _ = writeln!(
        out,
        "{}  {}",
        tier_colored(tier, format!("{}/100", analysis.score())).bold(),
        format!("({})", tier.as_str()).dimmed()
    );
    if let Some(verdict) = analysis.verdict.as_deref().filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "{verdict}");
    }

    let insights = analysis.key_insights();
    if !insights.is_empty() {
        let _ = writeln!(out, "\n{}", "🔍 Key Insights".bold());
        for insight in insights {
            let _ = writeln!(out, "  • {insight}");
        }
    }

    let recommendations = analysis.recommendations();
    if !recommendations.is_empty() {
        let _ = writeln!(out, "\n{}", "💡 Recommendations".bold());
        for rec in recommendations {
            let _ = writeln!(out, "  {} {rec}", "✓".green());
        }
    }

    for block in analysis.platform_summaries() {
        let _ = writeln!(out, "\n{}  {}/100", block.platform.label().bold(), block.score);
        let _ = writeln!(out, "  {}", block.summary);
    }
}

/// `a`, `a and b`, `a, b, and c`.
fn join_with_and(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => (*one).to_string(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

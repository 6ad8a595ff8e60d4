use std::fmt::Write;

use colored::Colorize;
use saasprobe_core::format::format_date;
use saasprobe_core::project::Project;

use super::{push_banner, status_badge};

/// Project list with an optional error banner on top.
pub fn render(projects: &[Project], banner: Option<&str>) -> String {
    let mut out = String::new();
    push_banner(&mut out, banner);

    let _ = writeln!(out, "{}", "Projects".bold());
    let _ = writeln!(
        out,
        "{}",
        "Manage and track your SaaS validation projects".dimmed()
    );
    out.push('\n');

    if projects.is_empty() {
        let _ = writeln!(out, "No projects yet");
        let _ = writeln!(
            out,
            "Create your first project with `saasprobe projects new` to start validating your SaaS idea."
        );
        return out;
    }

    for project in projects {
        let _ = writeln!(
            out,
            "{} {}  {}",
            format!("#{}", project.id).dimmed(),
            project.name.bold(),
            status_badge(project.status)
        );
        if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "    {description}");
        }
        let (shown, hidden) = project.keyword_preview();
        if !shown.is_empty() {
            let mut line = shown.join(", ");
            if hidden > 0 {
                let _ = write!(line, " +{hidden} more");
            }
            let _ = writeln!(out, "    {}", line.cyan());
        }
        let _ = writeln!(
            out,
            "    {}",
            format!("Created {}", format_date(&project.created_at)).dimmed()
        );
        out.push('\n');
    }

    out
}

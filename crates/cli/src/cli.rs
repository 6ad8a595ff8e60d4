//! Command-line surface.

use clap::{Parser, Subcommand};
use saasprobe_core::subscription::Plan;
use saasprobe_core::types::DbId;

#[derive(Parser, Debug)]
#[command(name = "saasprobe")]
#[command(version, about = "Validate SaaS ideas against Reddit, Twitter and LinkedIn demand")]
pub struct Cli {
    /// Backend base URL (overrides SAASPROBE_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log requests and session transitions to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Sign in.
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored token.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Validation projects.
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
    /// Current plan and usage.
    Billing {
        #[command(subcommand)]
        command: Option<BillingCommand>,
    },
    /// Pricing table.
    Plans,
    /// Start a checkout for a plan and open it in the browser.
    Checkout {
        #[arg(value_parser = parse_plan)]
        plan: Plan,
        /// Print the checkout URL without opening a browser.
        #[arg(long, default_value_t = false)]
        no_browser: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects.
    List,
    /// Create a project and watch its validation.
    New {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated keywords.
        #[arg(long)]
        keywords: Option<String>,
        /// Return after creating instead of watching.
        #[arg(long, default_value_t = false)]
        no_watch: bool,
    },
    /// Show a project once.
    Show { id: DbId },
    /// Follow a project until its validation finishes.
    Watch { id: DbId },
    /// Re-run validation for a project, then watch it.
    Retry { id: DbId },
    /// Delete a project.
    Delete {
        id: DbId,
        /// Skip the confirmation prompt.
        #[arg(long, short, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BillingCommand {
    /// Cancel the subscription at the end of the billing period.
    Cancel {
        #[arg(long, short, default_value_t = false)]
        yes: bool,
    },
}

fn parse_plan(raw: &str) -> Result<Plan, String> {
    raw.parse::<Plan>().map_err(|e| e.to_string())
}

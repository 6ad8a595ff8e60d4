//! Terminal front end for the SaaS Probe validation service.
//!
//! Each subcommand plays the part of one screen of the web app: it loads
//! what it needs through [`saasprobe_client`], renders a view and reports
//! failures through [`feedback`].

pub mod app;
pub mod cli;
pub mod commands;
pub mod feedback;
pub mod views;

pub use app::App;
pub use cli::Cli;
pub use feedback::{CliError, CliResult};

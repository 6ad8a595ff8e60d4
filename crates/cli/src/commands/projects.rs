use std::future::Future;
use std::sync::Arc;

use saasprobe_client::poller::{self, PollPhase, PollState, PollerConfig, ProjectSource};
use saasprobe_client::{AuthContext, AuthState};
use saasprobe_core::project::{ProjectCreate, ProjectStatus};
use saasprobe_core::types::DbId;

use super::load_banner;
use crate::app::{App, Input};
use crate::cli::ProjectsCommand;
use crate::feedback::{self, CliError, CliResult};
use crate::views::{dashboard, project};

pub(super) async fn run(app: &mut App, command: ProjectsCommand) -> CliResult<()> {
    app.require_session()?;
    match command {
        ProjectsCommand::List => list(app).await,
        ProjectsCommand::New {
            name,
            description,
            keywords,
            no_watch,
        } => create(app, name, description, keywords, no_watch).await,
        ProjectsCommand::Show { id } => show(app, id).await,
        ProjectsCommand::Watch { id } => watch(app, id).await,
        ProjectsCommand::Retry { id } => {
            retry(&app.api, id).await?;
            watch(app, id).await
        }
        ProjectsCommand::Delete { id, yes } => delete(app, id, yes).await,
    }
}

async fn list(app: &App) -> CliResult<()> {
    match app.api.list_projects().await {
        Ok(projects) => {
            print!("{}", dashboard::render(&projects, None));
            Ok(())
        }
        Err(e) => {
            let banner = load_banner(e, "projects")?;
            print!("{}", dashboard::render(&[], Some(&banner)));
            Err(CliError::Reported(banner))
        }
    }
}

async fn create(
    app: &mut App,
    name: Option<String>,
    description: Option<String>,
    keywords: Option<String>,
    no_watch: bool,
) -> CliResult<()> {
    let name = app.input.value_or_prompt(name, "Project name").await?;
    let description = match description {
        Some(d) => d,
        None => app.input.prompt("Description (optional)").await?,
    };
    let keywords = match keywords {
        Some(k) => k,
        None => {
            app.input
                .prompt("Keywords, comma-separated (optional)")
                .await?
        }
    };

    let request = ProjectCreate::from_form(&name, &description, &keywords);
    let created = app
        .api
        .create_project(&request)
        .await
        .map_err(CliError::action("create project"))?;

    println!(
        "{}",
        feedback::success(&format!("Created project #{} ({})", created.id, created.name))
    );
    if no_watch {
        println!("Follow it with `saasprobe projects watch {}`.", created.id);
        return Ok(());
    }
    watch(app, created.id).await
}

async fn show(app: &App, id: DbId) -> CliResult<()> {
    match app.api.get_project(id).await {
        Ok(detail) => {
            print!("{}", project::render(&detail, None));
            Ok(())
        }
        Err(e) => {
            let banner = load_banner(e, "project")?;
            println!("{}", feedback::banner(&banner));
            Err(CliError::Reported(banner))
        }
    }
}

async fn retry(source: &dyn ProjectSource, id: DbId) -> CliResult<()> {
    let task = source
        .requeue_project(id)
        .await
        .map_err(CliError::action("retry validation"))?;
    tracing::debug!(project_id = id, task_id = %task.task_id, "Validation re-queued");
    println!("{}", feedback::success("Validation queued again."));
    Ok(())
}

async fn delete(app: &mut App, id: DbId, yes: bool) -> CliResult<()> {
    if !yes
        && !app
            .input
            .confirm("Are you sure you want to delete this project?")
            .await?
    {
        println!("Nothing deleted.");
        return Ok(());
    }

    app.api
        .delete_project(id)
        .await
        .map_err(CliError::action("delete project"))?;
    println!("{}", feedback::success(&format!("Deleted project #{id}.")));
    println!();
    list(app).await
}

// ---------------------------------------------------------------------------
// Watch
// ---------------------------------------------------------------------------

/// What has already been printed, so each change is shown once.
#[derive(Default)]
struct Printed {
    status: Option<ProjectStatus>,
    error: Option<String>,
}

/// Project screen driven by the status poller.
///
/// Ends when the project completes, on Ctrl-C, or when the user leaves a
/// failed project without retrying.
async fn watch(app: &mut App, id: DbId) -> CliResult<()> {
    let config = PollerConfig::from(&app.config);
    let source: Arc<dyn ProjectSource> = Arc::new(app.api.clone());
    let stop = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    follow(source, app.api.auth(), &mut app.input, id, config, stop).await
}

/// Watch loop behind [`watch`].
///
/// The auth receiver is taken before the poller starts so a 401 on the
/// very first fetch is still seen, and the first pass renders whatever the
/// poller has already recorded. The poller is torn down on every exit
/// path when its handle drops.
async fn follow(
    source: Arc<dyn ProjectSource>,
    auth: &AuthContext,
    input: &mut Input,
    id: DbId,
    config: PollerConfig,
    stop: impl Future<Output = ()>,
) -> CliResult<()> {
    let mut auth_rx = auth.subscribe();
    if *auth_rx.borrow_and_update() == AuthState::SessionExpired {
        return Err(CliError::SessionExpired);
    }

    let handle = poller::spawn(source.clone(), id, config);
    let mut state_rx = handle.subscribe();
    state_rx.mark_changed();
    tokio::pin!(stop);

    let mut printed = Printed::default();
    let mut awaiting_choice = false;

    loop {
        tokio::select! {
            changed = auth_rx.changed() => {
                if changed.is_ok() && *auth_rx.borrow_and_update() == AuthState::SessionExpired {
                    return Err(CliError::SessionExpired);
                }
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = state_rx.borrow_and_update().clone();
                print_update(&state, &mut printed, config.interval.as_secs());

                if state.phase == PollPhase::Stopped {
                    match state.status() {
                        Some(ProjectStatus::Completed) => return Ok(()),
                        Some(ProjectStatus::Failed) if !awaiting_choice => {
                            println!("\nType `r` and press Enter to retry validation, or just Enter to leave.");
                            awaiting_choice = true;
                        }
                        _ => {}
                    }
                }
            }
            line = input.next_line(), if awaiting_choice => {
                let wants_retry = line?.is_some_and(|l| l.trim().eq_ignore_ascii_case("r"));
                if !wants_retry {
                    return Ok(());
                }
                retry(source.as_ref(), id).await?;
                awaiting_choice = false;
                printed.status = None;
                handle.resume();
            }
            _ = &mut stop => {
                println!("\nStopped watching project #{id}.");
                return Ok(());
            }
        }
    }
}

fn print_update(state: &PollState, printed: &mut Printed, interval_secs: u64) {
    let Some(snapshot) = state.snapshot.as_ref() else {
        if let Some(error) = &state.last_error {
            if printed.error.as_ref() != Some(error) {
                println!(
                    "{}",
                    feedback::banner(&format!("Failed to load project: {error}"))
                );
                printed.error = Some(error.clone());
            }
        }
        return;
    };

    let status = snapshot.status();
    if printed.status != Some(status) {
        println!();
        print!("{}", project::render(snapshot, state.last_error.as_deref()));
        if !status.is_terminal() {
            println!("\nChecking again every {interval_secs}s. Press Ctrl-C to stop.");
        }
        printed.status = Some(status);
        printed.error = state.last_error.clone();
        return;
    }

    if state.last_error != printed.error {
        if let Some(error) = &state.last_error {
            println!("{}", feedback::banner(error));
        }
        printed.error = state.last_error.clone();
    }
}

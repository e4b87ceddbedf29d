use std::process::ExitCode;

use clap::Args;

use itt::Workspace;
use itt::console::ConsoleHost;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Name of the task to run
    task: String,
}

/// Run one task by name.
///
/// # Errors
///
/// Returns an error if the session cannot be waited for.
pub async fn run(
    args: &RunArgs,
    workspace: &Workspace<ConsoleHost>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if workspace.registry().get(&args.task).is_none() {
        eprintln!(
            "No task named '{}' in {}",
            args.task,
            workspace.task_file().display()
        );
        return Ok(ExitCode::FAILURE);
    }

    match workspace.run(&args.task) {
        Some(session) => super::finish(session).await,
        None => Ok(ExitCode::FAILURE),
    }
}

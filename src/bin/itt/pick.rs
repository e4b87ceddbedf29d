use std::process::ExitCode;

use itt::Workspace;
use itt::console::ConsoleHost;

/// Show the task list and run the selected task.
///
/// # Errors
///
/// Returns an error if the session cannot be waited for.
pub async fn run(workspace: &Workspace<ConsoleHost>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match workspace.pick() {
        Some(session) => super::finish(session).await,
        None => Ok(ExitCode::SUCCESS),
    }
}

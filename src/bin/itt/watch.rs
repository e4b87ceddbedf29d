use std::process::ExitCode;

use log::{debug, info};
use tokio::sync::mpsc;

use itt::Workspace;
use itt::console::{ConsoleHost, pick_task};
use itt::host::Host;

/// Pick and run tasks until the list is cancelled, applying workspace changes as
/// they arrive.
///
/// # Errors
///
/// Returns an error if the task list thread panics.
pub async fn run(mut workspace: Workspace<ConsoleHost>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (event_tx, mut event_rx) = mpsc::channel(16);
    workspace.watch(event_tx);

    loop {
        // The list runs on a blocking thread so reloads are applied while it is open
        let names = workspace.task_names();
        let mut picker = tokio::task::spawn_blocking(move || pick_task(&names));
        let selected = loop {
            tokio::select! {
                picked = &mut picker => break picked?,
                Some(event) = event_rx.recv() => workspace.handle_event(event),
            }
        };
        let Some(name) = selected else {
            debug!("Task list closed");
            break;
        };

        while let Ok(event) = event_rx.try_recv() {
            workspace.handle_event(event);
        }

        // A task removed while the list was open is skipped here
        let Some(session) = workspace.run(&name) else {
            continue;
        };

        let finished = session.finish();
        tokio::pin!(finished);
        let result = loop {
            tokio::select! {
                result = &mut finished => break result,
                Some(event) = event_rx.recv() => workspace.handle_event(event),
            }
        };
        if let Err(e) = result {
            workspace.host().show_error(&e.to_string());
        }
    }

    workspace.dispose();
    info!("Watch mode stopped");
    Ok(ExitCode::SUCCESS)
}

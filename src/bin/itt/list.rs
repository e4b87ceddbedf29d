use std::process::ExitCode;

use anstyle::{Effects, Style};
use clap::Args;

use itt::Workspace;
use itt::console::ConsoleHost;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the resolved tasks as JSON
    #[arg(long)]
    json: bool,
}

/// Print every task resolved for the workspace platform.
///
/// # Errors
///
/// Returns an error if the tasks cannot be serialized.
pub fn run(
    args: &ListArgs,
    workspace: &Workspace<ConsoleHost>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let tasks = workspace.resolve_all();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(ExitCode::SUCCESS);
    }

    if tasks.is_empty() {
        eprintln!("No tasks configured in {}", workspace.task_file().display());
        return Ok(ExitCode::SUCCESS);
    }

    let name_style = Style::new().effects(Effects::BOLD);
    let dim = Style::new().effects(Effects::DIMMED);
    for task in &tasks {
        let shell = task.shell.as_deref().unwrap_or("<user shell>");
        let shell_line = std::iter::once(shell)
            .chain(task.shell_args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        let focus = if task.steal_focus { " (steals focus)" } else { "" };
        println!("{name_style}{}{name_style:#}{focus}", task.name);
        println!("  {dim}shell:{dim:#}   {shell_line}");
        println!("  {dim}command:{dim:#} {}", task.command_line());
    }
    Ok(ExitCode::SUCCESS)
}

mod list;
mod pick;
mod run;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;

use itt::config_file::find_workspace_root;
use itt::console::ConsoleHost;
use itt::platform::Platform;
use itt::pty::PtySession;
use itt::{Workspace, WorkspaceOptions};

#[derive(Parser, Debug)]
#[command(name = "itt", about = "Pick a workspace task and run it in a new terminal")]
struct Cli {
    /// Workspace root (defaults to the nearest directory containing `.vscode`)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Settings file (defaults to `.vscode/settings.json` in the workspace)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Task file name inside `.vscode`, overriding the `taskFileName` setting
    #[arg(short, long)]
    task_file: Option<String>,

    /// Resolve tasks as if running on this platform
    #[arg(long, value_enum)]
    platform: Option<Platform>,

    /// Log file path (enables file logging in addition to stderr)
    #[arg(long)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pick a task from a list and run it
    Pick,
    /// Run a task by name
    Run(run::RunArgs),
    /// List the tasks with their resolved shell and command line
    List(list::ListArgs),
    /// Keep picking and running tasks, reloading them as the workspace changes
    Watch,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .as_ref()
        .map(std::fs::File::create)
        .transpose()?;
    itt::logger::init(log_file)?;

    let root = match cli.workspace {
        Some(root) => root,
        None => find_workspace_root(&std::env::current_dir()?),
    };
    debug!("Workspace root: {}", root.display());

    let mut options = WorkspaceOptions::new(&root);
    options.settings_file = cli.settings;
    options.task_file_name = cli.task_file;
    if let Some(platform) = cli.platform {
        options.platform = platform;
    }
    let workspace = Workspace::init(ConsoleHost::new(&root), options);

    match cli.command {
        None | Some(Commands::Pick) => pick::run(&workspace).await,
        Some(Commands::Run(ref args)) => run::run(args, &workspace).await,
        Some(Commands::List(ref args)) => list::run(args, &workspace),
        Some(Commands::Watch) => watch::run(workspace).await,
    }
}

/// Wait for a session to end and turn its exit code into ours.
async fn finish(session: PtySession) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let exit_code = session.finish().await?;
    Ok(if exit_code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

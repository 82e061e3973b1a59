mod app;
mod cli;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use app::App;
use cli::{Command, Outcome};
use todostore::{Config, InMemoryTodoRepo, JsonFileTodoRepo, Todo, TodoRepository, logging};

#[derive(Parser, Debug)]
#[command(author, version, about = "todostore: todo records kept in one JSON document", long_about = None)]
struct Args {
    /// Path to the JSON document (default: OS data dir)
    #[arg(long, global = true, env = "TODOSTORE_PATH")]
    store: Option<PathBuf>,

    /// Directory for log files (default: OS data dir)
    #[arg(long, global = true, env = "TODOSTORE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error|off
    #[arg(long, global = true, env = "TODOSTORE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Use in-memory store instead of the JSON document
    #[arg(long, global = true, default_value_t = false)]
    memory: bool,

    /// Start with demo todos (implies --memory)
    #[arg(long, global = true, default_value_t = false)]
    demo: bool,

    /// Tick interval of the TUI render loop in milliseconds
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = Config::resolve(args.store, args.log_dir, args.log_level)?;

    let _logger = match logging::init_logging(&config.log_level, &config.log_dir) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let repo: Arc<dyn TodoRepository> = if args.demo {
        Arc::new(InMemoryTodoRepo::with_seed(seed_todos()))
    } else if args.memory {
        Arc::new(InMemoryTodoRepo::default())
    } else {
        Arc::new(JsonFileTodoRepo::open(&config.store_path))
    };

    match args.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            ui::run(App::new(repo), Duration::from_millis(args.tick_ms))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { addr } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime
                .block_on(todostore::http::serve(repo, &addr))
                .with_context(|| format!("HTTP server on {addr} failed"))?;
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let mut stdout = std::io::stdout().lock();
            match cli::run(&repo, command, &mut stdout)? {
                Outcome::Done => Ok(ExitCode::SUCCESS),
                Outcome::Rejected => Ok(ExitCode::FAILURE),
            }
        }
    }
}

fn seed_todos() -> Vec<Todo> {
    vec![
        Todo::new("Write documentation", "Cover the HTTP routes"),
        Todo::new("Check open issues", ""),
        Todo::new("Draft release notes", "Mention the atomic save"),
    ]
}

use std::io::Write;

use anyhow::{Context, Result};
use clap::Subcommand;
use todostore::{NewTodo, RepoError, TodoId, TodoPatch, TodoRepository};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full-screen terminal UI (default)
    Tui,
    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = todostore::config::DEFAULT_HTTP_ADDR)]
        addr: String,
    },
    /// Print every todo as JSON
    List,
    /// Print one todo as JSON
    Show { id: String },
    /// Create a todo
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Create it already done
        #[arg(long, default_value_t = false)]
        done: bool,
    },
    /// Change only the given fields of a todo
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        done: Option<bool>,
    },
    /// Delete a todo
    Remove { id: String },
}

/// Outcome of a one-shot command. Recoverable repository outcomes are
/// reported on stderr and map to a non-zero exit code.
pub enum Outcome {
    Done,
    Rejected,
}

pub fn run<R: TodoRepository, W: Write>(
    repo: &R,
    command: Command,
    out: &mut W,
) -> Result<Outcome> {
    let result = match command {
        // interactive commands are dispatched by main
        Command::Tui | Command::Serve { .. } => return Ok(Outcome::Done),
        Command::List => {
            print_json(out, &repo.list_all())?;
            return Ok(Outcome::Done);
        }
        Command::Show { id } => repo.get_by_id(&parse_id(&id)),
        Command::Add {
            title,
            description,
            done,
        } => repo.create(NewTodo::new(title, description).done(done)),
        Command::Update {
            id,
            title,
            description,
            done,
        } => {
            let patch = TodoPatch {
                title,
                description,
                done_status: done,
            };
            repo.update(&parse_id(&id), patch)
        }
        Command::Remove { id } => repo.delete(&parse_id(&id)),
    };

    match result {
        Ok(todo) => {
            print_json(out, &todo)?;
            Ok(Outcome::Done)
        }
        Err(RepoError::NotFound(id)) => {
            eprintln!("todo not found: {id}");
            Ok(Outcome::Rejected)
        }
        Err(err @ (RepoError::DuplicateContent { .. } | RepoError::Validation(_))) => {
            eprintln!("{err}");
            Ok(Outcome::Rejected)
        }
        Err(err @ RepoError::StorageWrite { .. }) => {
            Err(anyhow::Error::new(err).context("change was not saved"))
        }
    }
}

/// Ids pasted from a terminal often carry surrounding whitespace.
fn parse_id(raw: &str) -> TodoId {
    TodoId::from(raw.trim())
}

fn print_json<W: Write, T: serde::Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to render JSON")?;
    writeln!(out)?;
    Ok(())
}

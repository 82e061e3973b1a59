//! JSON document store.
//!
//! The whole collection lives in one pretty-printed JSON array. Every call
//! re-reads the document; mutations rewrite it in full.
//!
//! # Invariants
//! - Reads never create or modify the document.
//! - A write stages the new content beside the document and renames it into
//!   place, so an aborted write leaves the previous document readable.
//! - A document that does not parse, or that repeats an id, reads as empty.
//!   Its bytes are copied aside before a mutation replaces them.
//! - One process serializes its own read-modify-write cycles. Separate
//!   processes sharing a document are not coordinated.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;

use super::{RepoError, RepoResult, TodoRepository};
use crate::domain::todo::{NewTodo, Todo, TodoId, TodoPatch};

const INDENT: &[u8] = b"    ";
const MAX_BACKUP_ATTEMPTS: u32 = 1000;

pub struct JsonFileTodoRepo {
    path: PathBuf,
    write_lock: Mutex<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Missing,
    Parsed,
    /// The document exists but could not be read or parsed.
    Degraded,
}

struct Snapshot {
    todos: Vec<Todo>,
    state: LoadState,
}

impl JsonFileTodoRepo {
    /// Binds the repository to `path`. Nothing is touched on disk until the
    /// first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Snapshot {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "event=store_load status=missing path={}",
                    self.path.display()
                );
                return Snapshot {
                    todos: Vec::new(),
                    state: LoadState::Missing,
                };
            }
            Err(err) => {
                error!(
                    "event=store_load status=unreadable path={} error={err}",
                    self.path.display()
                );
                return Snapshot {
                    todos: Vec::new(),
                    state: LoadState::Degraded,
                };
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Snapshot {
                todos: Vec::new(),
                state: LoadState::Parsed,
            };
        }

        match serde_json::from_slice::<Vec<Todo>>(&bytes) {
            Ok(todos) => {
                if let Some(id) = first_repeated_id(&todos) {
                    warn!(
                        "event=store_load status=duplicate_id path={} id={id}",
                        self.path.display()
                    );
                    return Snapshot {
                        todos: Vec::new(),
                        state: LoadState::Degraded,
                    };
                }
                debug!(
                    "event=store_load status=ok path={} count={}",
                    self.path.display(),
                    todos.len()
                );
                Snapshot {
                    todos,
                    state: LoadState::Parsed,
                }
            }
            Err(err) => {
                warn!(
                    "event=store_load status=malformed path={} error={err}",
                    self.path.display()
                );
                Snapshot {
                    todos: Vec::new(),
                    state: LoadState::Degraded,
                }
            }
        }
    }

    fn save(&self, todos: &[Todo]) -> RepoResult<()> {
        let write_err = |source: io::Error| RepoError::StorageWrite {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_err)?;

        let mut staged = NamedTempFile::new_in(parent).map_err(write_err)?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            let formatter = PrettyFormatter::with_indent(INDENT);
            let mut ser = Serializer::with_formatter(&mut writer, formatter);
            todos
                .serialize(&mut ser)
                .map_err(|err| write_err(io::Error::other(err)))?;
            writer.write_all(b"\n").map_err(write_err)?;
            writer.flush().map_err(write_err)?;
        }
        staged.as_file().sync_all().map_err(write_err)?;
        staged
            .persist(&self.path)
            .map_err(|err| write_err(err.error))?;

        info!(
            "event=store_save status=ok path={} count={}",
            self.path.display(),
            todos.len()
        );
        Ok(())
    }

    /// Copies an unusable document to a timestamped sibling so the next
    /// save cannot destroy it. An existing backup is never overwritten.
    fn preserve_degraded(&self) -> RepoResult<PathBuf> {
        let write_err = |source: io::Error| RepoError::StorageWrite {
            path: self.path.clone(),
            source,
        };

        let mut original = File::open(&self.path).map_err(write_err)?;
        let (backup, mut target) = self.create_backup_file().map_err(write_err)?;
        io::copy(&mut original, &mut target).map_err(write_err)?;
        target.sync_all().map_err(write_err)?;
        warn!(
            "event=store_preserve status=ok path={} backup={}",
            self.path.display(),
            backup.display()
        );
        Ok(backup)
    }

    fn create_backup_file(&self) -> io::Result<(PathBuf, File)> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "todos.json".to_string());
        let base = format!("{name}.malformed-{secs}");

        for attempt in 0..MAX_BACKUP_ATTEMPTS {
            let candidate = match attempt {
                0 => self.path.with_file_name(&base),
                n => self.path.with_file_name(format!("{base}-{n}")),
            };
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => return Ok((candidate, file)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free backup name for {base}"),
        ))
    }

    /// Runs one read-modify-write cycle. `op` failing means nothing is written.
    fn mutate<T>(&self, op: impl FnOnce(&mut Vec<Todo>) -> RepoResult<T>) -> RepoResult<T> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = self.load();
        let out = op(&mut snapshot.todos)?;
        if snapshot.state == LoadState::Degraded {
            self.preserve_degraded()?;
        }
        self.save(&snapshot.todos)?;
        Ok(out)
    }
}

fn first_repeated_id(todos: &[Todo]) -> Option<&TodoId> {
    let mut seen = HashSet::with_capacity(todos.len());
    todos.iter().map(|t| &t.id).find(|id| !seen.insert(*id))
}

impl TodoRepository for JsonFileTodoRepo {
    fn list_all(&self) -> Vec<Todo> {
        self.load().todos
    }

    fn get_by_id(&self, id: &TodoId) -> RepoResult<Todo> {
        super::find(&self.load().todos, id)
    }

    fn create(&self, input: NewTodo) -> RepoResult<Todo> {
        let todo = self.mutate(|todos| super::insert(todos, input))?;
        info!("event=todo_created id={}", todo.id);
        Ok(todo)
    }

    fn update(&self, id: &TodoId, patch: TodoPatch) -> RepoResult<Todo> {
        let todo = self.mutate(|todos| super::apply_patch(todos, id, patch))?;
        info!("event=todo_updated id={}", todo.id);
        Ok(todo)
    }

    fn delete(&self, id: &TodoId) -> RepoResult<Todo> {
        let todo = self.mutate(|todos| super::remove(todos, id))?;
        info!("event=todo_deleted id={}", todo.id);
        Ok(todo)
    }
}

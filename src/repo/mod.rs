use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::todo::{NewTodo, Todo, TodoId, TodoPatch, TodoValidationError};

pub mod json_file;
pub mod memory;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("todo not found: {0}")]
    NotFound(TodoId),
    #[error("a todo with the same title and description already exists")]
    DuplicateContent { title: String, description: String },
    #[error(transparent)]
    Validation(#[from] TodoValidationError),
    #[error("failed to write todo store `{}`: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateContent { .. })
    }
}

/// Every call observes the current stored collection; implementations keep
/// no cache between calls.
pub trait TodoRepository: Send + Sync {
    /// Full collection in storage order. Unreadable storage yields an empty list.
    fn list_all(&self) -> Vec<Todo>;
    fn get_by_id(&self, id: &TodoId) -> RepoResult<Todo>;
    fn create(&self, input: NewTodo) -> RepoResult<Todo>;
    fn update(&self, id: &TodoId, patch: TodoPatch) -> RepoResult<Todo>;
    fn delete(&self, id: &TodoId) -> RepoResult<Todo>;
}

impl<R: TodoRepository + ?Sized> TodoRepository for Box<R> {
    fn list_all(&self) -> Vec<Todo> {
        (**self).list_all()
    }

    fn get_by_id(&self, id: &TodoId) -> RepoResult<Todo> {
        (**self).get_by_id(id)
    }

    fn create(&self, input: NewTodo) -> RepoResult<Todo> {
        (**self).create(input)
    }

    fn update(&self, id: &TodoId, patch: TodoPatch) -> RepoResult<Todo> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &TodoId) -> RepoResult<Todo> {
        (**self).delete(id)
    }
}

impl<R: TodoRepository + ?Sized> TodoRepository for Arc<R> {
    fn list_all(&self) -> Vec<Todo> {
        (**self).list_all()
    }

    fn get_by_id(&self, id: &TodoId) -> RepoResult<Todo> {
        (**self).get_by_id(id)
    }

    fn create(&self, input: NewTodo) -> RepoResult<Todo> {
        (**self).create(input)
    }

    fn update(&self, id: &TodoId, patch: TodoPatch) -> RepoResult<Todo> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &TodoId) -> RepoResult<Todo> {
        (**self).delete(id)
    }
}

// Collection rules shared by every backend. Each returns before touching
// `todos` when a precondition fails, so callers can skip the write.

pub(crate) fn find(todos: &[Todo], id: &TodoId) -> RepoResult<Todo> {
    todos
        .iter()
        .find(|t| &t.id == id)
        .cloned()
        .ok_or_else(|| RepoError::NotFound(id.clone()))
}

pub(crate) fn insert(todos: &mut Vec<Todo>, input: NewTodo) -> RepoResult<Todo> {
    input.validate()?;
    if todos
        .iter()
        .any(|t| t.same_content(&input.title, &input.description))
    {
        return Err(RepoError::DuplicateContent {
            title: input.title,
            description: input.description,
        });
    }
    let todo = input.into_todo();
    todos.push(todo.clone());
    Ok(todo)
}

pub(crate) fn apply_patch(todos: &mut [Todo], id: &TodoId, patch: TodoPatch) -> RepoResult<Todo> {
    let slot = todos
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| RepoError::NotFound(id.clone()))?;
    let mut updated = slot.clone();
    updated.apply(patch);
    updated.validate()?;
    *slot = updated.clone();
    Ok(updated)
}

pub(crate) fn remove(todos: &mut Vec<Todo>, id: &TodoId) -> RepoResult<Todo> {
    let pos = todos
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| RepoError::NotFound(id.clone()))?;
    Ok(todos.remove(pos))
}

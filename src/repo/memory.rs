use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{RepoResult, TodoRepository};
use crate::domain::todo::{NewTodo, Todo, TodoId, TodoPatch};

#[derive(Default)]
pub struct InMemoryTodoRepo {
    items: Mutex<Vec<Todo>>,
}

impl InMemoryTodoRepo {
    pub fn with_seed(seed: impl IntoIterator<Item = Todo>) -> Self {
        Self {
            items: Mutex::new(seed.into_iter().collect()),
        }
    }

    fn items(&self) -> MutexGuard<'_, Vec<Todo>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TodoRepository for InMemoryTodoRepo {
    fn list_all(&self) -> Vec<Todo> {
        self.items().clone()
    }

    fn get_by_id(&self, id: &TodoId) -> RepoResult<Todo> {
        super::find(&self.items(), id)
    }

    fn create(&self, input: NewTodo) -> RepoResult<Todo> {
        super::insert(&mut self.items(), input)
    }

    fn update(&self, id: &TodoId, patch: TodoPatch) -> RepoResult<Todo> {
        super::apply_patch(&mut self.items(), id, patch)
    }

    fn delete(&self, id: &TodoId) -> RepoResult<Todo> {
        super::remove(&mut self.items(), id)
    }
}

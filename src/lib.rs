//! Todo records kept in a single JSON document, with a terminal UI and an
//! HTTP façade on top of one repository contract.

pub mod config;
pub mod domain;
pub mod http;
pub mod logging;
pub mod repo;

pub use config::Config;
pub use domain::todo::{NewTodo, Todo, TodoId, TodoPatch, TodoValidationError};
pub use repo::json_file::JsonFileTodoRepo;
pub use repo::memory::InMemoryTodoRepo;
pub use repo::{RepoError, RepoResult, TodoRepository};

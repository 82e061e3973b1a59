use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque record identity. Fresh ids are 32 lowercase hex characters, but any
/// string already present in a stored document is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "doneStatus", default)]
    pub done_status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
}

impl Todo {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: TodoId::generate(),
            title: title.into(),
            description: description.into(),
            done_status: false,
        }
    }

    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_title(&self.title)
    }

    pub fn same_content(&self, title: &str, description: &str) -> bool {
        self.title == title && self.description == description
    }

    /// Applies only the fields present in `patch`. The id is never touched.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(done) = patch.done_status {
            self.done_status = done;
        }
    }
}

/// Input for creating a record. The repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "doneStatus", default)]
    pub done_status: bool,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            done_status: false,
        }
    }

    pub fn done(mut self, done_status: bool) -> Self {
        self.done_status = done_status;
        self
    }

    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_title(&self.title)
    }

    pub(crate) fn into_todo(self) -> Todo {
        Todo {
            id: TodoId::generate(),
            title: self.title,
            description: self.description,
            done_status: self.done_status,
        }
    }
}

/// Partial update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "doneStatus", default)]
    pub done_status: Option<bool>,
}

impl TodoPatch {
    pub fn done(done_status: bool) -> Self {
        Self {
            done_status: Some(done_status),
            ..Self::default()
        }
    }
}

fn validate_title(title: &str) -> Result<(), TodoValidationError> {
    if title.trim().is_empty() {
        return Err(TodoValidationError::EmptyTitle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_hex_and_distinct() {
        let a = TodoId::generate();
        let b = TodoId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let todo = Todo {
            id: TodoId::from("1"),
            title: "Task 1".into(),
            description: "Desc 1".into(),
            done_status: true,
        };
        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "1",
                "title": "Task 1",
                "description": "Desc 1",
                "doneStatus": true
            })
        );
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let todo: Todo = serde_json::from_str(r#"{"id":"x","title":"t"}"#).unwrap();
        assert_eq!(todo.description, "");
        assert!(!todo.done_status);
    }

    #[test]
    fn apply_keeps_untouched_fields() {
        let mut todo = Todo::new("T", "D");
        let id = todo.id.clone();
        todo.apply(TodoPatch::done(true));
        assert_eq!(todo.title, "T");
        assert_eq!(todo.description, "D");
        assert!(todo.done_status);
        assert_eq!(todo.id, id);
    }

    #[test]
    fn patch_ignores_unknown_id_key() {
        let patch: TodoPatch = serde_json::from_str(r#"{"id":"other","title":"new"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("new"));
        assert!(patch.description.is_none());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(
            NewTodo::new("   ", "d").validate(),
            Err(TodoValidationError::EmptyTitle)
        );
        assert!(NewTodo::new("ok", "").validate().is_ok());
    }
}

//! HTTP façade over a [`TodoRepository`].
//!
//! ## Routes
//!
//! - `GET /`: liveness message.
//! - `GET /todos`: full collection.
//! - `GET /todo/:id`: one record, `404` when absent.
//! - `POST /add_todo`: create, `400` on duplicate content.
//! - `PUT /update_todo/:id`: partial update, `404` when absent.
//! - `DELETE /remove_todo/:id`: delete, `404` when absent.
//!
//! Failures, including unparseable request bodies, use `{ "detail": "..." }`
//! bodies. Repository calls run on the
//! blocking pool since every call touches the filesystem.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use log::{debug, error, info};
use serde_json::{Value, json};

use crate::domain::todo::{NewTodo, Todo, TodoId, TodoPatch};
use crate::repo::{RepoError, RepoResult, TodoRepository};

pub type SharedRepo = Arc<dyn TodoRepository>;

/// Build an axum `Router` serving the given repository.
pub fn router(repo: SharedRepo) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/todos", get(list_handler))
        .route("/todo/:id", get(get_handler))
        .route("/add_todo", post(create_handler))
        .route("/update_todo/:id", put(update_handler))
        .route("/remove_todo/:id", delete(delete_handler))
        .with_state(repo)
}

/// Serve the repository over HTTP at `addr` (e.g. `"127.0.0.1:8000"`).
pub async fn serve(repo: SharedRepo, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("event=http_listen status=ok addr={}", listener.local_addr()?);
    axum::serve(listener, router(repo)).await
}

#[derive(Debug)]
pub enum ApiError {
    Repo(RepoError),
    /// The request body was missing, not JSON, or the wrong shape.
    Body(JsonRejection),
    Task(String),
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Body(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::Repo(RepoError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Todo not found".to_string())
            }
            Self::Repo(RepoError::DuplicateContent { .. }) => (
                StatusCode::BAD_REQUEST,
                "Todo with the same title and description already exists.".to_string(),
            ),
            Self::Repo(err @ RepoError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            Self::Repo(err @ RepoError::StorageWrite { .. }) => {
                error!("event=http_store_failure status=error error={err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::Body(rejection) => {
                debug!("event=http_bad_body status={}", rejection.status());
                (rejection.status(), rejection.body_text())
            }
            Self::Task(message) => {
                error!("event=http_task_failure status=error error={message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

async fn with_repo<T, F>(repo: &SharedRepo, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn TodoRepository) -> RepoResult<T> + Send + 'static,
{
    let repo = Arc::clone(repo);
    tokio::task::spawn_blocking(move || op(repo.as_ref()))
        .await
        .map_err(|err| ApiError::Task(err.to_string()))?
        .map_err(ApiError::from)
}

/// `GET /`
async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "API is running" }))
}

/// `GET /todos`
async fn list_handler(State(repo): State<SharedRepo>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = with_repo(&repo, |repo| Ok(repo.list_all())).await?;
    Ok(Json(todos))
}

/// `GET /todo/:id`
async fn get_handler(
    State(repo): State<SharedRepo>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = TodoId::from(id);
    let todo = with_repo(&repo, move |repo| repo.get_by_id(&id)).await?;
    Ok(Json(todo))
}

/// `POST /add_todo`
async fn create_handler(
    State(repo): State<SharedRepo>,
    body: Result<Json<NewTodo>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = body?;
    debug!("event=http_create title_len={}", input.title.len());
    let todo = with_repo(&repo, move |repo| repo.create(input)).await?;
    Ok(Json(json!({ "message": "Todo added successfully", "todo": todo })))
}

/// `PUT /update_todo/:id`
async fn update_handler(
    State(repo): State<SharedRepo>,
    Path(id): Path<String>,
    body: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(patch) = body?;
    let id = TodoId::from(id);
    let todo = with_repo(&repo, move |repo| repo.update(&id, patch)).await?;
    Ok(Json(json!({ "message": "Todo updated", "todo": todo })))
}

/// `DELETE /remove_todo/:id`
async fn delete_handler(
    State(repo): State<SharedRepo>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = TodoId::from(id);
    let todo = with_repo(&repo, move |repo| repo.delete(&id)).await?;
    Ok(Json(json!({ "message": "Todo deleted", "todo": todo })))
}

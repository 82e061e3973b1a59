//! HTTP façade integration tests.
//!
//! Starts an axum server over a temporary JSON store and exercises it with
//! reqwest.

use std::sync::Arc;

use serde_json::{Value, json};
use todostore::http::{self, SharedRepo};
use todostore::JsonFileTodoRepo;

/// Bind to port 0 and return the base URL. The temp dir must outlive the test.
async fn start_server() -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let repo: SharedRepo = Arc::new(JsonFileTodoRepo::open(dir.path().join("todos.json")));
    let app = http::router(repo);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), dir)
}

async fn add(client: &reqwest::Client, base: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{base}/add_todo"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn root_reports_running() {
    let (base, _dir) = start_server().await;
    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "API is running");
}

#[tokio::test]
async fn list_starts_empty() {
    let (base, _dir) = start_server().await;
    let resp = reqwest::get(format!("{base}/todos")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_then_get() {
    let (base, _dir) = start_server().await;
    let client = reqwest::Client::new();

    let resp = add(&client, &base, json!({ "title": "A", "description": "B" })).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Todo added successfully");
    assert_eq!(body["todo"]["doneStatus"], false);
    let id = body["todo"]["id"].as_str().unwrap().to_string();

    let resp = client.get(format!("{base}/todo/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let todo: Value = resp.json().await.unwrap();
    assert_eq!(todo["title"], "A");
    assert_eq!(todo["description"], "B");
}

#[tokio::test]
async fn client_supplied_id_is_ignored() {
    let (base, _dir) = start_server().await;
    let client = reqwest::Client::new();

    let resp = add(
        &client,
        &base,
        json!({ "id": "mine", "title": "A", "description": "" }),
    )
    .await;
    let body: Value = resp.json().await.unwrap();
    assert_ne!(body["todo"]["id"], "mine");
}

#[tokio::test]
async fn duplicate_create_is_bad_request() {
    let (base, _dir) = start_server().await;
    let client = reqwest::Client::new();

    add(&client, &base, json!({ "title": "A", "description": "B" })).await;
    let resp = add(&client, &base, json!({ "title": "A", "description": "B" })).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("already exists"));

    let todos: Value = reqwest::get(format!("{base}/todos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(todos.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_title_is_unprocessable() {
    let (base, _dir) = start_server().await;
    let client = reqwest::Client::new();

    let resp = add(&client, &base, json!({ "title": "  ", "description": "x" })).await;
    assert_eq!(resp.status(), 422);
}

async fn assert_detail_body(resp: reqwest::Response, status: u16) {
    assert_eq!(resp.status(), status);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("application/json"), "{content_type}");
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()), "{body}");
}

#[tokio::test]
async fn malformed_bodies_get_detail_json() {
    let (base, _dir) = start_server().await;
    let client = reqwest::Client::new();

    let missing_title = add(&client, &base, json!({ "description": "x" })).await;
    assert_detail_body(missing_title, 422).await;

    let not_json = client
        .post(format!("{base}/add_todo"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_detail_body(not_json, 400).await;

    let created: Value = add(&client, &base, json!({ "title": "T" }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["todo"]["id"].as_str().unwrap();
    let wrong_type = client
        .put(format!("{base}/update_todo/{id}"))
        .json(&json!({ "doneStatus": "yes" }))
        .send()
        .await
        .unwrap();
    assert_detail_body(wrong_type, 422).await;

    let list: Value = reqwest::get(format!("{base}/todos")).await.unwrap().json().await.unwrap();
    assert_eq!(list[0]["doneStatus"], false);
}

#[tokio::test]
async fn update_is_partial() {
    let (base, _dir) = start_server().await;
    let client = reqwest::Client::new();

    let body: Value = add(&client, &base, json!({ "title": "T", "description": "D" }))
        .await
        .json()
        .await
        .unwrap();
    let id = body["todo"]["id"].as_str().unwrap().to_string();

    let resp = client
        .put(format!("{base}/update_todo/{id}"))
        .json(&json!({ "doneStatus": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Todo updated");
    assert_eq!(
        body["todo"],
        json!({ "id": id, "title": "T", "description": "D", "doneStatus": true })
    );
}

#[tokio::test]
async fn unknown_id_is_not_found_for_get_update_and_delete() {
    let (base, _dir) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/todo/nope")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Todo not found");

    let resp = client
        .put(format!("{base}/update_todo/nope"))
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(format!("{base}/remove_todo/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn delete_returns_removed_record() {
    let (base, _dir) = start_server().await;
    let client = reqwest::Client::new();

    let body: Value = add(&client, &base, json!({ "title": "bye", "description": "" }))
        .await
        .json()
        .await
        .unwrap();
    let id = body["todo"]["id"].as_str().unwrap().to_string();

    let resp = client
        .delete(format!("{base}/remove_todo/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Todo deleted");
    assert_eq!(body["todo"]["title"], "bye");

    let resp = client.get(format!("{base}/todo/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

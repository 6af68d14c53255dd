use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use taskboard::{app, auth::USER_ID_HEADER, db, state::AppState};
use tower::ServiceExt;

async fn test_app() -> Router {
    let pool = db::memory_pool().await.unwrap();
    app(AppState::new(pool, 50))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> i64 {
    let (status, user) = send(
        app,
        Method::PUT,
        "/users",
        None,
        Some(json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user["id"].as_i64().unwrap()
}

async fn create_project(app: &Router, user: i64, title: &str) -> i64 {
    let (status, project) = send(
        app,
        Method::PUT,
        "/projects",
        Some(user),
        Some(json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    project["id"].as_i64().unwrap()
}

async fn board(app: &Router, user: i64, project: i64, query: &str) -> Vec<Value> {
    let (status, body) = send(
        app,
        Method::GET,
        &format!("/projects/{}/buckets{}", project, query),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn health_endpoints() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/readyz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["sqlite"]["ok"], true);
}

#[tokio::test]
async fn requests_without_user_are_unauthorized() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/projects",
        None,
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn bucket_lifecycle() {
    let app = test_app().await;
    let user = register(&app, "ada").await;
    let project = create_project(&app, user, "Launch").await;

    let buckets = board(&app, user, project, "").await;
    assert_eq!(buckets.len(), 1);
    let backlog = buckets[0]["id"].as_i64().unwrap();

    let (status, created) = send(
        &app,
        Method::PUT,
        &format!("/projects/{}/buckets", project),
        Some(user),
        Some(json!({ "title": "Doing", "limit": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["position"].as_f64().unwrap() > buckets[0]["position"].as_f64().unwrap());
    assert_eq!(created["created_by"]["username"], "ada");
    let doing = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::POST,
        &format!("/projects/{}/buckets/{}", project, doing),
        Some(user),
        Some(json!({ "title": "In progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "In progress");
    assert_eq!(updated["limit"], 2);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/projects/{}/buckets/{}", project, doing),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully deleted.");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/projects/{}/buckets/{}", project, backlog),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["code"], 10002);
}

#[tokio::test]
async fn board_read_filters_and_moves() {
    let app = test_app().await;
    let user = register(&app, "ada").await;
    let project = create_project(&app, user, "Launch").await;

    let mut ids = Vec::new();
    for (title, priority) in [("a", 3), ("b", 1), ("c", 3)] {
        let (status, task) = send(
            &app,
            Method::PUT,
            &format!("/projects/{}/tasks", project),
            Some(user),
            Some(json!({ "title": title, "priority": priority })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(task["id"].as_i64().unwrap());
    }

    let buckets = board(&app, user, project, "?filter=priority%20%3D%203").await;
    let titles: Vec<_> = buckets[0]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["a", "c"]);
    assert_eq!(buckets[0]["count"], 2);

    // move c between a and b
    let (status, moved) = send(
        &app,
        Method::POST,
        &format!("/tasks/{}/position", ids[2]),
        Some(user),
        Some(json!({ "before_id": ids[0], "after_id": ids[1] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let buckets = board(&app, user, project, "").await;
    let order: Vec<_> = buckets[0]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![ids[0], ids[2], ids[1]]);
    assert_eq!(buckets[0]["tasks"][1]["kanban_position"], moved["kanban_position"]);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/projects/{}/buckets?filter=priority%20%3D%3D", project),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4024);
}

#[tokio::test]
async fn task_list_reports_pagination() {
    let app = test_app().await;
    let user = register(&app, "ada").await;
    let project = create_project(&app, user, "Launch").await;
    for i in 0..5 {
        send(
            &app,
            Method::PUT,
            &format!("/projects/{}/tasks", project),
            Some(user),
            Some(json!({ "title": format!("task {}", i) })),
        )
        .await;
    }

    let request = Request::builder()
        .uri(format!("/projects/{}/tasks?per_page=2&page=3", project))
        .header(USER_ID_HEADER, user.to_string())
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-pagination-total-pages"], "3");
    assert_eq!(response.headers()["x-pagination-result-count"], "5");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let tasks: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "task 4");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/projects/{}/tasks?sort_by=labels", project),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sharing_controls_access() {
    let app = test_app().await;
    let owner = register(&app, "owner").await;
    let guest = register(&app, "guest").await;
    let project = create_project(&app, owner, "Private").await;

    let (status, _) = send(&app, Method::GET, &format!("/projects/{}", project), Some(guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/projects/{}/shares", project),
        Some(owner),
        Some(json!({ "user_id": guest, "right": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let buckets = board(&app, guest, project, "").await;
    assert_eq!(buckets.len(), 1);

    // read-only guests cannot add buckets
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/projects/{}/buckets", project),
        Some(guest),
        Some(json!({ "title": "Mine" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn import_then_read() {
    let app = test_app().await;
    let user = register(&app, "ada").await;

    let (status, projects) = send(
        &app,
        Method::PUT,
        "/import",
        Some(user),
        Some(json!([{
            "title": "From Trello",
            "buckets": [
                { "title": "Todo", "tasks": [
                    { "title": "one", "labels": [{ "title": "bug", "color": "red" }] },
                    { "title": "two" }
                ]},
                { "title": "Done", "tasks": [{ "title": "old", "done": true }] }
            ]
        }])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project = projects[0]["id"].as_i64().unwrap();

    let buckets = board(&app, user, project, "").await;
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["tasks"][0]["labels"][0]["hex_color"], "f87168");
    assert_eq!(buckets[1]["tasks"][0]["done"], true);
}

#[tokio::test]
async fn pages_far_past_the_end_are_empty() {
    let app = test_app().await;
    let user = register(&app, "ada").await;
    let project = create_project(&app, user, "Launch").await;
    send(
        &app,
        Method::PUT,
        &format!("/projects/{}/tasks", project),
        Some(user),
        Some(json!({ "title": "only" })),
    )
    .await;

    let buckets = board(&app, user, project, &format!("?page={}&per_page=50", i64::MAX)).await;
    assert!(buckets[0]["tasks"].as_array().unwrap().is_empty());
    assert_eq!(buckets[0]["count"], 1);

    let (status, tasks) = send(
        &app,
        Method::GET,
        &format!("/projects/{}/tasks?page={}&per_page=50", project, i64::MAX),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(tasks.as_array().unwrap().is_empty());
}

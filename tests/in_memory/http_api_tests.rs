//! Tests for the HTTP routes over an in-memory store.

use super::helpers::{app, error_code, reviewer_ids, send};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rstest::rstest;
use serde_json::json;
use tower::ServiceExt;

async fn add_backend_team(app: &Router, members: &[&str]) {
    let roster: Vec<_> = members
        .iter()
        .map(|id| json!({"user_id": id, "username": format!("user {id}"), "is_active": true}))
        .collect();
    let (status, _) = send(
        app,
        Method::POST,
        "/team/add",
        Some(json!({"team_name": "backend", "members": roster})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn open_pull_request(app: &Router, id: &str, author: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/pullRequest/create",
        Some(json!({"pull_request_id": id, "pull_request_name": "feat", "author_id": author})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body["pr"].clone()
}

async fn set_active(app: &Router, user: &str, active: bool) {
    let (status, body) = send(
        app,
        Method::POST,
        "/users/setIsActive",
        Some(json!({"user_id": user, "is_active": active})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_reports_ok(app: Router) {
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK"}));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_team_echoes_roster_and_rejects_repeat(app: Router) {
    let payload = json!({
        "team_name": "backend",
        "members": [
            {"user_id": "u1", "username": "Alice", "is_active": true},
            {"user_id": "u2", "username": "Bob", "is_active": false}
        ]
    });

    let (created, body) = send(&app, Method::POST, "/team/add", Some(payload.clone())).await;
    assert_eq!(created, StatusCode::CREATED);
    assert_eq!(body["team"]["team_name"], "backend");
    assert_eq!(body["team"]["members"].as_array().map(Vec::len), Some(2));

    let (repeat, error) = send(&app, Method::POST, "/team/add", Some(payload)).await;
    assert_eq!(repeat, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&error), "TEAM_EXISTS");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_team_returns_bare_roster_or_not_found(app: Router) {
    add_backend_team(&app, &["u1", "u2"]).await;

    let (found, body) = send(&app, Method::GET, "/team/get?team_name=backend", None).await;
    assert_eq!(found, StatusCode::OK);
    assert_eq!(body["team_name"], "backend");
    assert_eq!(body["members"][0]["user_id"], "u1");

    let (missing, error) = send(&app, Method::GET, "/team/get?team_name=frontend", None).await;
    assert_eq!(missing, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&error), "NOT_FOUND");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_is_active_returns_user_with_team(app: Router) {
    add_backend_team(&app, &["u1", "u2"]).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users/setIsActive",
        Some(json!({"user_id": "u2", "is_active": false})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["user_id"], "u2");
    assert_eq!(body["user"]["team_name"], "backend");
    assert_eq!(body["user"]["is_active"], false);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_pull_request_assigns_teammates(app: Router) {
    add_backend_team(&app, &["u1", "u2", "u3"]).await;

    let pull_request = open_pull_request(&app, "pr1", "u1").await;

    assert_eq!(pull_request["status"], "OPEN");
    assert!(pull_request.get("createdAt").is_some());
    assert!(pull_request.get("mergedAt").is_none());
    let mut reviewers = reviewer_ids(&pull_request);
    reviewers.sort();
    assert_eq!(reviewers, vec!["u2".to_owned(), "u3".to_owned()]);

    let (repeat, error) = send(
        &app,
        Method::POST,
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr1", "pull_request_name": "again", "author_id": "u1"})),
    )
    .await;
    assert_eq!(repeat, StatusCode::CONFLICT);
    assert_eq!(error_code(&error), "PR_EXISTS");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassign_without_candidate_conflicts(app: Router) {
    add_backend_team(&app, &["u1", "u2"]).await;
    open_pull_request(&app, "pr1", "u1").await;

    let (status, error) = send(
        &app,
        Method::POST,
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr1", "old_user_id": "u2"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&error), "NO_CANDIDATE");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassign_reports_replacement(app: Router) {
    add_backend_team(&app, &["u1", "u2", "u3"]).await;
    set_active(&app, "u3", false).await;
    open_pull_request(&app, "pr1", "u1").await;
    set_active(&app, "u3", true).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr1", "old_user_id": "u2"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(body["replaced_by"], "u3");
    assert_eq!(reviewer_ids(&body["pr"]), vec!["u3".to_owned()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_is_idempotent_and_blocks_reassign(app: Router) {
    add_backend_team(&app, &["u1", "u2", "u3"]).await;
    let opened = open_pull_request(&app, "pr1", "u1").await;
    let merge = json!({"pull_request_id": "pr1"});

    let (first, merged) = send(&app, Method::POST, "/pullRequest/merge", Some(merge.clone())).await;
    let (second, again) = send(&app, Method::POST, "/pullRequest/merge", Some(merge)).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(merged["pr"]["status"], "MERGED");
    assert_eq!(merged["pr"]["mergedAt"], again["pr"]["mergedAt"]);

    let reviewer = reviewer_ids(&opened).into_iter().next().expect("a reviewer");
    let (status, error) = send(
        &app,
        Method::POST,
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr1", "old_user_id": reviewer})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&error), "PR_MERGED");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reviews_and_statistics_reflect_assignments(app: Router) {
    add_backend_team(&app, &["u1", "u2"]).await;
    open_pull_request(&app, "pr1", "u1").await;

    let (status, reviews) = send(&app, Method::GET, "/users/getReview?user_id=u2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviews["user_id"], "u2");
    assert_eq!(reviews["pull_requests"][0]["pull_request_id"], "pr1");
    assert_eq!(reviews["pull_requests"][0]["status"], "OPEN");

    let (status, stats) = send(&app, Method::GET, "/statistics/reviewers", None).await;
    assert_eq!(status, StatusCode::OK);
    let entry = stats["statistics"]
        .as_array()
        .and_then(|entries| entries.iter().find(|entry| entry["user_id"] == "u2"))
        .cloned()
        .expect("u2 should appear in statistics");
    assert_eq!(entry["open_reviews"], 1);
    assert_eq!(entry["total_reviews"], 1);
}

#[rstest]
#[case::unknown_author(
    "/pullRequest/create",
    json!({"pull_request_id": "pr9", "pull_request_name": "x", "author_id": "ghost"}),
    StatusCode::NOT_FOUND,
    "NOT_FOUND"
)]
#[case::unknown_pull_request(
    "/pullRequest/merge",
    json!({"pull_request_id": "missing"}),
    StatusCode::NOT_FOUND,
    "NOT_FOUND"
)]
#[case::blank_team_name(
    "/team/add",
    json!({"team_name": "", "members": []}),
    StatusCode::BAD_REQUEST,
    "BAD_REQUEST"
)]
#[case::over_long_pull_request_id(
    "/pullRequest/create",
    json!({"pull_request_id": "p".repeat(256), "pull_request_name": "x", "author_id": "u1"}),
    StatusCode::BAD_REQUEST,
    "BAD_REQUEST"
)]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_requests_use_error_envelope(
    app: Router,
    #[case] uri: &str,
    #[case] payload: serde_json::Value,
    #[case] expected_status: StatusCode,
    #[case] expected_code: &str,
) {
    let (status, body) = send(&app, Method::POST, uri, Some(payload)).await;

    assert_eq!(status, expected_status);
    assert_eq!(error_code(&body), expected_code);
    assert!(body["error"]["message"].is_string());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_json_is_bad_request(app: Router) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/team/add")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request should build");

    let response = app.oneshot(request).await.expect("router should respond");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

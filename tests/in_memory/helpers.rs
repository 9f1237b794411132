//! Shared helpers for in-memory integration tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mockable::DefaultClock;
use review_rotation::{
    assignment::{
        adapters::{memory::InMemoryReviewStore, random::ThreadRandom},
        services::{CreateTeamRequest, ReviewAssignmentService},
    },
    http::router,
};
use rstest::fixture;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Service type used across in-memory integration tests.
pub type MemoryService = ReviewAssignmentService<InMemoryReviewStore, DefaultClock, ThreadRandom>;

/// Builds a service over a fresh in-memory store.
#[fixture]
pub fn service() -> MemoryService {
    ReviewAssignmentService::new(
        Arc::new(InMemoryReviewStore::new()),
        Arc::new(DefaultClock),
        Arc::new(ThreadRandom),
    )
}

/// Builds the API router over a fresh in-memory store.
#[fixture]
pub fn app(service: MemoryService) -> Router {
    router(service)
}

/// Registers `team` with every member available.
#[expect(clippy::expect_used, reason = "Test helper fails fast on setup errors")]
pub async fn register_team(service: &MemoryService, team: &str, members: &[&str]) {
    let request = members
        .iter()
        .fold(CreateTeamRequest::new(team), |request, member| {
            request.with_member(*member, format!("user {member}"), true)
        });
    service
        .create_team(request)
        .await
        .expect("team registration should succeed");
}

/// Sends one request through `app` and decodes the JSON response.
#[expect(clippy::expect_used, reason = "Test helper fails fast on transport errors")]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };
    (status, json)
}

/// Extracts the error code from an error envelope.
pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

/// Extracts assigned reviewer ids from a pull request body.
pub fn reviewer_ids(pull_request: &Value) -> Vec<String> {
    pull_request["assigned_reviewers"]
        .as_array()
        .map(|reviewers| {
            reviewers
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

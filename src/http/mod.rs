//! HTTP boundary for the reviewer assignment service.
//!
//! Requests and responses use the JSON field names of the public API
//! (`team_name`, `pull_request_id`, `assigned_reviewers`, ...). Failures
//! render as `{"error": {"code", "message"}}` with the status and code from
//! [`crate::assignment::services::ErrorCode`].

mod dto;
mod error;
mod handlers;

pub use dto::{
    AddTeamBody, CreatePullRequestBody, MergeBody, PullRequestBody, ReassignBody, SetIsActiveBody,
    TeamBody, TeamMemberBody,
};
pub use error::ApiError;

use crate::assignment::{
    ports::{RandomSource, ReviewStore},
    services::ReviewAssignmentService,
};
use axum::{
    Router,
    routing::{get, post},
};
use mockable::Clock;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the API router around `service`.
pub fn router<S, C, R>(service: ReviewAssignmentService<S, C, R>) -> Router
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .route("/team/add", post(handlers::add_team::<S, C, R>))
        .route("/team/get", get(handlers::get_team::<S, C, R>))
        .route("/users/setIsActive", post(handlers::set_is_active::<S, C, R>))
        .route("/users/getReview", get(handlers::user_reviews::<S, C, R>))
        .route("/pullRequest/create", post(handlers::create_pull_request::<S, C, R>))
        .route("/pullRequest/reassign", post(handlers::reassign::<S, C, R>))
        .route("/pullRequest/merge", post(handlers::merge::<S, C, R>))
        .route("/statistics/reviewers", get(handlers::statistics::<S, C, R>))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(service))
}

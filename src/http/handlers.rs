//! Route handlers.

use super::{
    ApiError,
    dto::{
        AddTeamBody, CreatePullRequestBody, HealthResponse, MergeBody, PullRequestBody,
        PullRequestResponse, ReassignBody, ReassignResponse, ReviewerLoadBody, SetIsActiveBody,
        StatisticsResponse, TeamBody, TeamQuery, TeamResponse, UserBody, UserQuery,
        UserResponse, UserReviewsResponse,
    },
};
use crate::assignment::{
    ports::{RandomSource, ReviewStore},
    services::{CreatePullRequestRequest, CreateTeamRequest, ReviewAssignmentService},
};
use axum::{
    Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
};
use mockable::Clock;
use std::sync::Arc;

type Service<S, C, R> = State<Arc<ReviewAssignmentService<S, C, R>>>;
type ApiResult<T> = Result<T, ApiError>;

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK" })
}

pub(super) async fn add_team<S, C, R>(
    State(service): Service<S, C, R>,
    payload: Result<Json<AddTeamBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    let Json(body) = payload?;
    let request = body
        .members
        .into_iter()
        .fold(CreateTeamRequest::new(body.team_name), |request, member| {
            request.with_member(member.user_id, member.username, member.is_active)
        });
    let team = service.create_team(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(TeamResponse {
            team: TeamBody::from(&team),
        }),
    ))
}

pub(super) async fn get_team<S, C, R>(
    State(service): Service<S, C, R>,
    params: Result<Query<TeamQuery>, QueryRejection>,
) -> ApiResult<Json<TeamBody>>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    let Query(query) = params?;
    let team = service.get_team(&query.team_name).await?;
    Ok(Json(TeamBody::from(&team)))
}

pub(super) async fn set_is_active<S, C, R>(
    State(service): Service<S, C, R>,
    payload: Result<Json<SetIsActiveBody>, JsonRejection>,
) -> ApiResult<Json<UserResponse>>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    let Json(body) = payload?;
    let user = service
        .set_user_availability(&body.user_id, body.is_active)
        .await?;
    Ok(Json(UserResponse {
        user: UserBody::from(&user),
    }))
}

pub(super) async fn user_reviews<S, C, R>(
    State(service): Service<S, C, R>,
    params: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<UserReviewsResponse>>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    let Query(query) = params?;
    let reviews = service.reviews_for_user(&query.user_id).await?;
    Ok(Json(UserReviewsResponse {
        user_id: reviews.user_id.to_string(),
        pull_requests: reviews.pull_requests.iter().map(Into::into).collect(),
    }))
}

pub(super) async fn create_pull_request<S, C, R>(
    State(service): Service<S, C, R>,
    payload: Result<Json<CreatePullRequestBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    let Json(body) = payload?;
    let pull_request = service
        .create_pull_request(CreatePullRequestRequest::new(
            body.pull_request_id,
            body.pull_request_name,
            body.author_id,
        ))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PullRequestResponse {
            pr: PullRequestBody::from(&pull_request),
        }),
    ))
}

pub(super) async fn reassign<S, C, R>(
    State(service): Service<S, C, R>,
    payload: Result<Json<ReassignBody>, JsonRejection>,
) -> ApiResult<Json<ReassignResponse>>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    let Json(body) = payload?;
    let reassignment = service
        .reassign_reviewer(&body.pull_request_id, &body.old_user_id)
        .await?;
    Ok(Json(ReassignResponse::from(&reassignment)))
}

pub(super) async fn merge<S, C, R>(
    State(service): Service<S, C, R>,
    payload: Result<Json<MergeBody>, JsonRejection>,
) -> ApiResult<Json<PullRequestResponse>>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    let Json(body) = payload?;
    let pull_request = service.merge_pull_request(&body.pull_request_id).await?;
    Ok(Json(PullRequestResponse {
        pr: PullRequestBody::from(&pull_request),
    }))
}

pub(super) async fn statistics<S, C, R>(
    State(service): Service<S, C, R>,
) -> ApiResult<Json<StatisticsResponse>>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    let loads = service.reviewer_statistics().await?;
    Ok(Json(StatisticsResponse {
        statistics: loads.iter().map(ReviewerLoadBody::from).collect(),
    }))
}

//! Request and response bodies.

use crate::assignment::{
    domain::{PullRequest, PullRequestSummary, ReviewerLoad, Team, User},
    services::Reassignment,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Team member as submitted and returned by the team endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberBody {
    /// User identifier.
    #[serde(default)]
    pub user_id: String,
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Availability flag.
    #[serde(default)]
    pub is_active: bool,
}

/// `POST /team/add` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddTeamBody {
    /// Team name.
    #[serde(default)]
    pub team_name: String,
    /// Members to register.
    #[serde(default)]
    pub members: Vec<TeamMemberBody>,
}

/// Team with its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBody {
    /// Team name.
    pub team_name: String,
    /// Members ordered by user id.
    pub members: Vec<TeamMemberBody>,
}

impl From<&Team> for TeamBody {
    fn from(team: &Team) -> Self {
        Self {
            team_name: team.name().to_string(),
            members: team
                .members()
                .iter()
                .map(|member| TeamMemberBody {
                    user_id: member.id().to_string(),
                    username: member.username().to_string(),
                    is_active: member.is_available(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct TeamResponse {
    pub(super) team: TeamBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct TeamQuery {
    #[serde(default)]
    pub(super) team_name: String,
}

/// `POST /users/setIsActive` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetIsActiveBody {
    /// User identifier.
    #[serde(default)]
    pub user_id: String,
    /// New availability flag.
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct UserBody {
    user_id: String,
    username: String,
    team_name: String,
    is_active: bool,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id().to_string(),
            username: user.username().to_string(),
            team_name: user.team_name().to_string(),
            is_active: user.is_available(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct UserResponse {
    pub(super) user: UserBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserQuery {
    #[serde(default)]
    pub(super) user_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PullRequestShortBody {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: &'static str,
}

impl From<&PullRequestSummary> for PullRequestShortBody {
    fn from(summary: &PullRequestSummary) -> Self {
        Self {
            pull_request_id: summary.id.to_string(),
            pull_request_name: summary.title.to_string(),
            author_id: summary.author_id.to_string(),
            status: summary.status.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct UserReviewsResponse {
    pub(super) user_id: String,
    pub(super) pull_requests: Vec<PullRequestShortBody>,
}

/// `POST /pullRequest/create` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePullRequestBody {
    /// Pull request identifier.
    #[serde(default)]
    pub pull_request_id: String,
    /// Title.
    #[serde(default)]
    pub pull_request_name: String,
    /// Author.
    #[serde(default)]
    pub author_id: String,
}

/// Pull request as returned by the pull request endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestBody {
    /// Pull request identifier.
    pub pull_request_id: String,
    /// Title.
    pub pull_request_name: String,
    /// Author.
    pub author_id: String,
    /// `OPEN` or `MERGED`.
    pub status: String,
    /// Reviewers in assignment order.
    pub assigned_reviewers: Vec<String>,
    /// Creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Merge timestamp, absent while open.
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<&PullRequest> for PullRequestBody {
    fn from(pull_request: &PullRequest) -> Self {
        Self {
            pull_request_id: pull_request.id().to_string(),
            pull_request_name: pull_request.title().to_string(),
            author_id: pull_request.author_id().to_string(),
            status: pull_request.status().as_str().to_owned(),
            assigned_reviewers: pull_request
                .reviewers()
                .iter()
                .map(ToString::to_string)
                .collect(),
            created_at: pull_request.created_at(),
            merged_at: pull_request.merged_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PullRequestResponse {
    pub(super) pr: PullRequestBody,
}

/// `POST /pullRequest/reassign` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReassignBody {
    /// Pull request identifier.
    #[serde(default)]
    pub pull_request_id: String,
    /// Reviewer to replace.
    #[serde(default)]
    pub old_user_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ReassignResponse {
    pr: PullRequestBody,
    replaced_by: String,
}

impl From<&Reassignment> for ReassignResponse {
    fn from(reassignment: &Reassignment) -> Self {
        Self {
            pr: PullRequestBody::from(&reassignment.pull_request),
            replaced_by: reassignment.replaced_by.to_string(),
        }
    }
}

/// `POST /pullRequest/merge` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeBody {
    /// Pull request identifier.
    #[serde(default)]
    pub pull_request_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ReviewerLoadBody {
    user_id: String,
    open_reviews: u64,
    total_reviews: u64,
}

impl From<&ReviewerLoad> for ReviewerLoadBody {
    fn from(load: &ReviewerLoad) -> Self {
        Self {
            user_id: load.user_id.to_string(),
            open_reviews: load.open_reviews,
            total_reviews: load.total_reviews,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct StatisticsResponse {
    pub(super) statistics: Vec<ReviewerLoadBody>,
}

#[derive(Debug, Serialize)]
pub(super) struct HealthResponse {
    pub(super) status: &'static str,
}

//! Domain model for reviewer assignment.
//!
//! Teams own users, users carry an availability flag, and pull requests carry
//! a reviewer set plus an `OPEN`/`MERGED` lifecycle status. Infrastructure
//! concerns stay outside this boundary.

mod error;
mod ids;
mod pull_request;
mod team;
mod user;

pub use error::{AssignmentDomainError, ParsePullRequestStatusError};
pub use ids::{
    MAX_NAME_CHARS, MAX_TITLE_CHARS, PullRequestId, PullRequestTitle, TeamId, TeamName, UserId,
    Username,
};
pub use pull_request::{
    PersistedPullRequestData, PullRequest, PullRequestStatus, PullRequestSummary, ReviewerLoad,
};
pub use team::{NewTeamMember, Team};
pub use user::User;

/// Maximum number of reviewers selected when a pull request is opened.
pub const MAX_INITIAL_REVIEWERS: usize = 2;

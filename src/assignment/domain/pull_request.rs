//! Pull request aggregate and its `OPEN` → `MERGED` lifecycle.

use super::{
    AssignmentDomainError, ParsePullRequestStatusError, PullRequestId, PullRequestTitle, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pull request lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestStatus {
    /// Accepting reviewer changes.
    Open,
    /// Terminal; the reviewer set is frozen.
    Merged,
}

impl PullRequestStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Merged)
    }

    /// Returns whether `self → target` is a valid lifecycle transition.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Merged))
    }
}

impl TryFrom<&str> for PullRequestStatus {
    type Error = ParsePullRequestStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            _ => Err(ParsePullRequestStatusError(value.to_owned())),
        }
    }
}

/// Pull request with its assigned reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    id: PullRequestId,
    title: PullRequestTitle,
    author_id: UserId,
    status: PullRequestStatus,
    reviewers: Vec<UserId>,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPullRequestData {
    /// Persisted identifier.
    pub id: PullRequestId,
    /// Persisted title.
    pub title: PullRequestTitle,
    /// Persisted author.
    pub author_id: UserId,
    /// Persisted lifecycle status.
    pub status: PullRequestStatus,
    /// Persisted reviewer set.
    pub reviewers: Vec<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted merge timestamp, if merged.
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Opens a new pull request with an initial reviewer set.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::SelfReview`] when the author is among
    /// the reviewers, or [`AssignmentDomainError::DuplicateReviewer`] when a
    /// reviewer is listed twice.
    pub fn open(
        id: PullRequestId,
        title: PullRequestTitle,
        author_id: UserId,
        reviewers: Vec<UserId>,
        clock: &impl Clock,
    ) -> Result<Self, AssignmentDomainError> {
        let mut seen = HashSet::with_capacity(reviewers.len());
        for reviewer in &reviewers {
            if *reviewer == author_id {
                return Err(AssignmentDomainError::SelfReview(author_id.to_string()));
            }
            if !seen.insert(reviewer) {
                return Err(AssignmentDomainError::DuplicateReviewer(
                    reviewer.to_string(),
                ));
            }
        }

        Ok(Self {
            id,
            title,
            author_id,
            status: PullRequestStatus::Open,
            reviewers,
            created_at: clock.utc(),
            merged_at: None,
        })
    }

    /// Reconstructs a pull request from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPullRequestData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            author_id: data.author_id,
            status: data.status,
            reviewers: data.reviewers,
            created_at: data.created_at,
            merged_at: data.merged_at,
        }
    }

    /// Returns the pull request identifier.
    #[must_use]
    pub const fn id(&self) -> &PullRequestId {
        &self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &PullRequestTitle {
        &self.title
    }

    /// Returns the author.
    #[must_use]
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> PullRequestStatus {
        self.status
    }

    /// Returns the assigned reviewers.
    #[must_use]
    pub fn reviewers(&self) -> &[UserId] {
        &self.reviewers
    }

    /// Returns whether `user` is an assigned reviewer.
    #[must_use]
    pub fn has_reviewer(&self, user: &UserId) -> bool {
        self.reviewers.contains(user)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the merge timestamp, if merged.
    #[must_use]
    pub const fn merged_at(&self) -> Option<DateTime<Utc>> {
        self.merged_at
    }

    /// Returns the short form used in per-user review listings.
    #[must_use]
    pub fn summary(&self) -> PullRequestSummary {
        PullRequestSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Short pull request form listed per reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    /// Pull request identifier.
    pub id: PullRequestId,
    /// Title.
    pub title: PullRequestTitle,
    /// Author.
    pub author_id: UserId,
    /// Lifecycle status.
    pub status: PullRequestStatus,
}

/// Current review workload of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerLoad {
    /// Reviewer.
    pub user_id: UserId,
    /// Assignments on pull requests that are still open.
    pub open_reviews: u64,
    /// Assignments on pull requests of any status.
    pub total_reviews: u64,
}

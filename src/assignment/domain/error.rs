//! Error types for assignment domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing assignment domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentDomainError {
    /// A team name is empty after trimming.
    #[error("team name must not be empty")]
    EmptyTeamName,

    /// A user identifier is empty after trimming.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// A username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// A pull request identifier is empty after trimming.
    #[error("pull request id must not be empty")]
    EmptyPullRequestId,

    /// A pull request title is empty after trimming.
    #[error("pull request title must not be empty")]
    EmptyPullRequestTitle,

    /// A value exceeds the length its column can hold.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },

    /// The same user was listed more than once in a team registration.
    #[error("user '{0}' is listed more than once")]
    DuplicateMember(String),

    /// A pull request author was listed as one of its own reviewers.
    #[error("author '{0}' cannot review their own pull request")]
    SelfReview(String),

    /// A reviewer was listed more than once on a pull request.
    #[error("reviewer '{0}' is assigned more than once")]
    DuplicateReviewer(String),
}

/// Error returned while parsing pull request statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pull request status: {0}")]
pub struct ParsePullRequestStatusError(pub String);

//! Fixed mapping from assignment failures to caller-facing codes.

use super::{AssignmentError, ConflictKind, EntityKind};

/// Caller-facing failure code with its HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Team name already registered.
    TeamExists,
    /// Pull request id already used.
    PrExists,
    /// Pull request already merged.
    PrMerged,
    /// Reviewer not assigned to the pull request.
    NotAssigned,
    /// No replacement reviewer available.
    NoCandidate,
    /// Unknown team, user or pull request.
    NotFound,
    /// Malformed or incomplete input.
    BadRequest,
    /// Operation deadline elapsed.
    Timeout,
    /// Store failure.
    Internal,
}

impl ErrorCode {
    /// Returns the code for `err`.
    #[must_use]
    pub const fn for_error(err: &AssignmentError) -> Self {
        match err {
            AssignmentError::Validation(_) => Self::BadRequest,
            AssignmentError::NotFound(..) => Self::NotFound,
            AssignmentError::AlreadyExists(EntityKind::PullRequest, _) => Self::PrExists,
            AssignmentError::AlreadyExists(..) => Self::TeamExists,
            AssignmentError::Conflict(ConflictKind::AlreadyMerged) => Self::PrMerged,
            AssignmentError::Conflict(ConflictKind::NotAssigned) => Self::NotAssigned,
            AssignmentError::Conflict(ConflictKind::NoCandidate) => Self::NoCandidate,
            AssignmentError::TimedOut(_) => Self::Timeout,
            AssignmentError::Store(_) => Self::Internal,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TeamExists => "TEAM_EXISTS",
            Self::PrExists => "PR_EXISTS",
            Self::PrMerged => "PR_MERGED",
            Self::NotAssigned => "NOT_ASSIGNED",
            Self::NoCandidate => "NO_CANDIDATE",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Timeout => "TIMEOUT",
            Self::Internal => "INTERNAL",
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::TeamExists | Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::PrExists | Self::PrMerged | Self::NotAssigned | Self::NoCandidate => 409,
            Self::Internal => 500,
            Self::Timeout => 504,
        }
    }
}

//! Identifier and validated scalar types for the assignment domain.

use super::AssignmentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column width for identifiers, team names, and usernames.
pub const MAX_NAME_CHARS: usize = 255;

/// Column width for pull request titles.
pub const MAX_TITLE_CHARS: usize = 1024;

/// Trims `raw` and rejects it with `empty` when nothing remains.
fn non_blank(raw: String, empty: AssignmentDomainError) -> Result<String, AssignmentDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.len() == raw.len() {
        return Ok(raw);
    }
    Ok(trimmed.to_owned())
}

/// Trims `raw`, then checks it is neither blank nor longer than `max`
/// characters.
fn bounded(
    raw: String,
    empty: AssignmentDomainError,
    field: &'static str,
    max: usize,
) -> Result<String, AssignmentDomainError> {
    let value = non_blank(raw, empty)?;
    if value.chars().count() > max {
        return Err(AssignmentDomainError::TooLong { field, max });
    }
    Ok(value)
}

/// Store-assigned numeric team identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(i32);

impl TeamId {
    /// Wraps a persisted team identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique, human-readable team name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(String);

impl TeamName {
    /// Creates a validated team name.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyTeamName`] when the value is
    /// empty after trimming.
    /// Returns [`AssignmentDomainError::TooLong`] when it exceeds its column
    /// width.
    pub fn new(value: impl Into<String>) -> Result<Self, AssignmentDomainError> {
        bounded(
            value.into(),
            AssignmentDomainError::EmptyTeamName,
            "team name",
            MAX_NAME_CHARS,
        )
        .map(Self)
    }

    /// Returns the team name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyUserId`] when the value is empty
    /// after trimming.
    /// Returns [`AssignmentDomainError::TooLong`] when it exceeds its column
    /// width.
    pub fn new(value: impl Into<String>) -> Result<Self, AssignmentDomainError> {
        bounded(
            value.into(),
            AssignmentDomainError::EmptyUserId,
            "user id",
            MAX_NAME_CHARS,
        )
        .map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a validated username.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyUsername`] when the value is
    /// empty after trimming.
    /// Returns [`AssignmentDomainError::TooLong`] when it exceeds its column
    /// width.
    pub fn new(value: impl Into<String>) -> Result<Self, AssignmentDomainError> {
        bounded(
            value.into(),
            AssignmentDomainError::EmptyUsername,
            "username",
            MAX_NAME_CHARS,
        )
        .map(Self)
    }

    /// Returns the username as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied pull request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestId(String);

impl PullRequestId {
    /// Creates a validated pull request identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyPullRequestId`] when the value is
    /// empty after trimming.
    /// Returns [`AssignmentDomainError::TooLong`] when it exceeds its column
    /// width.
    pub fn new(value: impl Into<String>) -> Result<Self, AssignmentDomainError> {
        bounded(
            value.into(),
            AssignmentDomainError::EmptyPullRequestId,
            "pull request id",
            MAX_NAME_CHARS,
        )
        .map(Self)
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PullRequestId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PullRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pull request title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestTitle(String);

impl PullRequestTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyPullRequestTitle`] when the value
    /// is empty after trimming.
    /// Returns [`AssignmentDomainError::TooLong`] when it exceeds its column
    /// width.
    pub fn new(value: impl Into<String>) -> Result<Self, AssignmentDomainError> {
        bounded(
            value.into(),
            AssignmentDomainError::EmptyPullRequestTitle,
            "pull request title",
            MAX_TITLE_CHARS,
        )
        .map(Self)
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PullRequestTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Store port: the unit-of-work boundary and the data operations the
//! assignment services require of the backing store.

use crate::assignment::domain::{
    NewTeamMember, PullRequest, PullRequestId, PullRequestStatus, PullRequestSummary,
    ReviewerLoad, TeamId, TeamName, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Transactional store.
///
/// Every assignment operation runs as one closure passed to
/// [`ReviewStore::in_transaction`]. The closure's writes become visible
/// together when it returns `Ok`; any `Err`, and any cancellation of the
/// awaiting future before commit, discards all of them.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Executes `work` as a single unit of work.
    ///
    /// Dropping the returned future cancels the unit. Cancellation observed
    /// before commit rolls everything back. A commit already under way is
    /// not interrupted: the in-memory store decides under its state mutex,
    /// but `PostgreSQL` may still commit after the caller has given up. A
    /// caller that timed out therefore cannot assume nothing was written,
    /// and re-driving a create may report it as already existing.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a [`StoreError`] converted into `E`
    /// when the unit cannot be started, is cancelled, or fails to commit.
    async fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static;
}

/// Data operations available inside a unit of work.
///
/// Reads observe the unit's own writes. Only [`UnitOfWork::lock_pull_request`]
/// takes a lock; candidate reads such as
/// [`UnitOfWork::available_team_members`] see committed flags without any
/// team-wide exclusion.
pub trait UnitOfWork {
    /// Returns the identifier of the team with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn find_team_id(&mut self, name: &TeamName) -> StoreResult<Option<TeamId>>;

    /// Inserts a team and returns its new identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateTeam`] when the name is taken.
    fn insert_team(&mut self, name: &TeamName) -> StoreResult<TeamId>;

    /// Inserts a user into `team`, or moves an existing user there with the
    /// supplied name and availability.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn upsert_user(&mut self, team: TeamId, member: &NewTeamMember) -> StoreResult<()>;

    /// Returns the members of `team` ordered by user id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn team_members(&mut self, team: TeamId) -> StoreResult<Vec<User>>;

    /// Looks up a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn find_user(&mut self, id: &UserId) -> StoreResult<Option<User>>;

    /// Sets a user's availability flag. Returns `false` when the user does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn set_user_available(&mut self, id: &UserId, available: bool) -> StoreResult<bool>;

    /// Returns available members of `team` that are not in `exclude`, in
    /// unspecified order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn available_team_members(
        &mut self,
        team: TeamId,
        exclude: &[UserId],
    ) -> StoreResult<Vec<UserId>>;

    /// Returns whether `user` is a reviewer on any open pull request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn has_open_reviews(&mut self, user: &UserId) -> StoreResult<bool>;

    /// Returns whether a pull request with this identifier exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn pull_request_exists(&mut self, id: &PullRequestId) -> StoreResult<bool>;

    /// Inserts the pull request row. Reviewer rows are inserted separately
    /// with [`UnitOfWork::insert_reviewer`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicatePullRequest`] when the id is taken.
    fn insert_pull_request(&mut self, pull_request: &PullRequest) -> StoreResult<()>;

    /// Acquires an exclusive lock on the pull request row for the rest of the
    /// unit of work and returns its current status, or `None` when the row
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn lock_pull_request(&mut self, id: &PullRequestId) -> StoreResult<Option<PullRequestStatus>>;

    /// Loads a pull request with its reviewer set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn find_pull_request(&mut self, id: &PullRequestId) -> StoreResult<Option<PullRequest>>;

    /// Returns whether `user` is assigned to review `pull_request`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn is_reviewer_assigned(
        &mut self,
        pull_request: &PullRequestId,
        user: &UserId,
    ) -> StoreResult<bool>;

    /// Adds a reviewer-assignment row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn insert_reviewer(&mut self, pull_request: &PullRequestId, user: &UserId) -> StoreResult<()>;

    /// Removes a reviewer-assignment row. Returns `false` when no row existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn delete_reviewer(&mut self, pull_request: &PullRequestId, user: &UserId)
    -> StoreResult<bool>;

    /// Sets the status to `MERGED` and records the merge timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn mark_merged(&mut self, id: &PullRequestId, merged_at: DateTime<Utc>) -> StoreResult<()>;

    /// Lists pull requests of any status on which `user` is a reviewer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn reviews_of(&mut self, user: &UserId) -> StoreResult<Vec<PullRequestSummary>>;

    /// Returns assignment counts for every user holding at least one
    /// assignment, ordered by user id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure or cancellation.
    fn reviewer_loads(&mut self) -> StoreResult<Vec<ReviewerLoad>>;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A team with the same name already exists.
    #[error("duplicate team name: {0}")]
    DuplicateTeam(TeamName),

    /// A pull request with the same identifier already exists.
    #[error("duplicate pull request identifier: {0}")]
    DuplicatePullRequest(PullRequestId),

    /// The caller abandoned the unit of work before it committed.
    #[error("unit of work cancelled before commit")]
    Cancelled,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

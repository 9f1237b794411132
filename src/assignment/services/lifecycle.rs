//! Pull request lifecycle orchestration and team administration.
//!
//! Each public operation runs as one unit of work against the
//! [`ReviewStore`]: it either commits every reviewer and availability change
//! it makes, or none of them.

use super::{CandidateSelector, availability};
use crate::assignment::{
    domain::{
        AssignmentDomainError, MAX_INITIAL_REVIEWERS, NewTeamMember, PullRequest, PullRequestId,
        PullRequestStatus, PullRequestSummary, PullRequestTitle, ReviewerLoad, Team, TeamName,
        User, UserId, Username,
    },
    ports::{RandomSource, ReviewStore, StoreError, UnitOfWork},
};
use mockable::Clock;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Deadline applied to each operation unless overridden.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Request payload for registering a team with its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTeamRequest {
    team_name: String,
    members: Vec<(String, String, bool)>,
}

impl CreateTeamRequest {
    /// Creates a request for a team with no members yet.
    #[must_use]
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a member with its initial availability.
    #[must_use]
    pub fn with_member(
        mut self,
        user_id: impl Into<String>,
        username: impl Into<String>,
        is_active: bool,
    ) -> Self {
        self.members
            .push((user_id.into(), username.into(), is_active));
        self
    }

    fn validate(self) -> Result<(TeamName, Vec<NewTeamMember>), AssignmentDomainError> {
        let name = TeamName::new(self.team_name)?;
        let mut seen = HashSet::with_capacity(self.members.len());
        let mut members = Vec::with_capacity(self.members.len());
        for (user_id, username, is_active) in self.members {
            let id = UserId::new(user_id)?;
            if !seen.insert(id.clone()) {
                return Err(AssignmentDomainError::DuplicateMember(id.to_string()));
            }
            members.push(NewTeamMember::new(id, Username::new(username)?, is_active));
        }
        Ok((name, members))
    }
}

/// Request payload for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequestRequest {
    id: String,
    title: String,
    author_id: String,
}

impl CreatePullRequestRequest {
    /// Creates a request with the required pull request fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_id: author_id.into(),
        }
    }
}

/// Outcome of a successful reviewer reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The pull request after the swap.
    pub pull_request: PullRequest,
    /// The newly assigned reviewer.
    pub replaced_by: UserId,
}

/// Pull requests a user has been asked to review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReviews {
    /// The reviewer.
    pub user_id: UserId,
    /// Pull requests of any status listing the reviewer.
    pub pull_requests: Vec<PullRequestSummary>,
}

/// Entity named by a not-found or already-exists failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A team.
    Team,
    /// A user.
    User,
    /// A pull request.
    PullRequest,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Team => "team",
            Self::User => "user",
            Self::PullRequest => "pull request",
        })
    }
}

/// Lifecycle precondition violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictKind {
    /// The pull request is merged and its reviewer set is frozen.
    #[error("cannot reassign on merged pull request")]
    AlreadyMerged,
    /// The reviewer being replaced is not assigned to the pull request.
    #[error("reviewer is not assigned to this pull request")]
    NotAssigned,
    /// No available teammate can take over the review.
    #[error("no active replacement candidate in team")]
    NoCandidate,
}

/// Service-level errors for reviewer assignment operations.
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// Input validation failed before any store access.
    #[error(transparent)]
    Validation(#[from] AssignmentDomainError),
    /// The named entity does not exist.
    #[error("{0} not found: {1}")]
    NotFound(EntityKind, String),
    /// The named entity already exists.
    #[error("{0} already exists: {1}")]
    AlreadyExists(EntityKind, String),
    /// A lifecycle precondition does not hold.
    #[error(transparent)]
    Conflict(#[from] ConflictKind),
    /// The operation deadline elapsed before the unit of work finished.
    ///
    /// The unit is rolled back unless its `PostgreSQL` commit was already in
    /// flight; see [`ReviewStore::in_transaction`].
    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),
    /// Store failure outside the business taxonomy.
    #[error(transparent)]
    Store(StoreError),
}

impl AssignmentError {
    /// Returns whether a retry wrapper may re-drive the same call.
    ///
    /// Business failures are final for the given input. Store failures and
    /// timeouts are not, because every operation re-checks its preconditions
    /// from scratch.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Store(_) | Self::TimedOut(_))
    }
}

impl From<StoreError> for AssignmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateTeam(name) => {
                Self::AlreadyExists(EntityKind::Team, name.to_string())
            }
            StoreError::DuplicatePullRequest(id) => {
                Self::AlreadyExists(EntityKind::PullRequest, id.to_string())
            }
            other => Self::Store(other),
        }
    }
}

/// Result type for reviewer assignment operations.
pub type AssignmentResult<T> = Result<T, AssignmentError>;

fn not_found(kind: EntityKind, id: impl fmt::Display) -> AssignmentError {
    AssignmentError::NotFound(kind, id.to_string())
}

/// Reviewer assignment and rotation service.
pub struct ReviewAssignmentService<S, C, R>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    store: Arc<S>,
    clock: Arc<C>,
    selector: CandidateSelector<R>,
    operation_timeout: Duration,
}

impl<S, C, R> Clone for ReviewAssignmentService<S, C, R>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            selector: self.selector.clone(),
            operation_timeout: self.operation_timeout,
        }
    }
}

impl<S, C, R> ReviewAssignmentService<S, C, R>
where
    S: ReviewStore + 'static,
    C: Clock + Send + Sync + 'static,
    R: RandomSource + 'static,
{
    /// Creates a new service using [`DEFAULT_OPERATION_TIMEOUT`].
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, random: Arc<R>) -> Self {
        Self {
            store,
            clock,
            selector: CandidateSelector::new(random),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the deadline applied to each operation.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Runs `work` as one unit of work bounded by the operation deadline.
    /// Elapsing the deadline drops the unit, which rolls it back.
    async fn run<T, F>(&self, operation: &'static str, work: F) -> AssignmentResult<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> AssignmentResult<T> + Send + 'static,
        T: Send + 'static,
    {
        if let Ok(result) =
            tokio::time::timeout(self.operation_timeout, self.store.in_transaction(work)).await
        {
            return result;
        }
        warn!(
            operation,
            timeout_ms = u64::try_from(self.operation_timeout.as_millis()).unwrap_or(u64::MAX),
            "operation deadline elapsed"
        );
        Err(AssignmentError::TimedOut(self.operation_timeout))
    }

    /// Registers a team and upserts its members.
    ///
    /// A member whose id is already known moves to the new team with the
    /// supplied name and availability.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Validation`] for blank names or repeated
    /// member ids, [`AssignmentError::AlreadyExists`] when the team name is
    /// taken, or a store failure.
    pub async fn create_team(&self, request: CreateTeamRequest) -> AssignmentResult<Team> {
        let (name, members) = request.validate()?;
        let team = self
            .run("create_team", move |unit: &mut dyn UnitOfWork| {
                if unit.find_team_id(&name)?.is_some() {
                    return Err(AssignmentError::AlreadyExists(
                        EntityKind::Team,
                        name.to_string(),
                    ));
                }
                let team_id = unit.insert_team(&name)?;
                for member in &members {
                    unit.upsert_user(team_id, member)?;
                }
                let registered = unit.team_members(team_id)?;
                Ok(Team::new(team_id, name, registered))
            })
            .await?;
        info!(
            team = %team.name(),
            members = team.members().len(),
            "team registered"
        );
        Ok(team)
    }

    /// Returns a team with its members.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::NotFound`] for an unknown team name.
    pub async fn get_team(&self, team_name: &str) -> AssignmentResult<Team> {
        let name = TeamName::new(team_name)?;
        self.run("get_team", move |unit: &mut dyn UnitOfWork| {
            let Some(team_id) = unit.find_team_id(&name)? else {
                return Err(not_found(EntityKind::Team, &name));
            };
            let members = unit.team_members(team_id)?;
            Ok(Team::new(team_id, name, members))
        })
        .await
    }

    /// Overrides a user's availability flag.
    ///
    /// The override holds until the next assignment or release touching the
    /// user recomputes it.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::NotFound`] for an unknown user.
    pub async fn set_user_availability(
        &self,
        user_id: &str,
        available: bool,
    ) -> AssignmentResult<User> {
        let id = UserId::new(user_id)?;
        let user = self
            .run("set_user_availability", move |unit: &mut dyn UnitOfWork| {
                if !unit.set_user_available(&id, available)? {
                    return Err(not_found(EntityKind::User, &id));
                }
                unit.find_user(&id)?
                    .ok_or_else(|| not_found(EntityKind::User, &id))
            })
            .await?;
        info!(user = %user.id(), available, "availability overridden");
        Ok(user)
    }

    /// Lists the pull requests on which a user is a reviewer.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::NotFound`] for an unknown user.
    pub async fn reviews_for_user(&self, user_id: &str) -> AssignmentResult<UserReviews> {
        let id = UserId::new(user_id)?;
        self.run("reviews_for_user", move |unit: &mut dyn UnitOfWork| {
            if unit.find_user(&id)?.is_none() {
                return Err(not_found(EntityKind::User, &id));
            }
            let pull_requests = unit.reviews_of(&id)?;
            Ok(UserReviews {
                user_id: id,
                pull_requests,
            })
        })
        .await
    }

    /// Opens a pull request and assigns up to two available teammates of the
    /// author as reviewers.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::AlreadyExists`] for a taken id,
    /// [`AssignmentError::NotFound`] for an unknown author, or a store
    /// failure.
    pub async fn create_pull_request(
        &self,
        request: CreatePullRequestRequest,
    ) -> AssignmentResult<PullRequest> {
        let id = PullRequestId::new(request.id)?;
        let title = PullRequestTitle::new(request.title)?;
        let author_id = UserId::new(request.author_id)?;
        let clock = Arc::clone(&self.clock);
        let selector = self.selector.clone();

        let pull_request = self
            .run("create_pull_request", move |unit: &mut dyn UnitOfWork| {
                if unit.pull_request_exists(&id)? {
                    return Err(AssignmentError::AlreadyExists(
                        EntityKind::PullRequest,
                        id.to_string(),
                    ));
                }
                let Some(author) = unit.find_user(&author_id)? else {
                    return Err(not_found(EntityKind::User, &author_id));
                };

                let reviewers = selector.select(
                    unit,
                    author.team_id(),
                    std::slice::from_ref(&author_id),
                    MAX_INITIAL_REVIEWERS,
                )?;
                let pull_request = PullRequest::open(id, title, author_id, reviewers, &*clock)?;

                unit.insert_pull_request(&pull_request)?;
                for reviewer in pull_request.reviewers() {
                    unit.insert_reviewer(pull_request.id(), reviewer)?;
                    availability::occupy(unit, reviewer)?;
                }
                Ok(pull_request)
            })
            .await?;

        info!(
            pull_request = %pull_request.id(),
            author = %pull_request.author_id(),
            reviewers = ?pull_request.reviewers(),
            "pull request opened"
        );
        Ok(pull_request)
    }

    /// Returns a pull request with its reviewer set.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::NotFound`] for an unknown id.
    pub async fn get_pull_request(&self, pull_request_id: &str) -> AssignmentResult<PullRequest> {
        let id = PullRequestId::new(pull_request_id)?;
        self.run("get_pull_request", move |unit: &mut dyn UnitOfWork| {
            unit.find_pull_request(&id)?
                .ok_or_else(|| not_found(EntityKind::PullRequest, &id))
        })
        .await
    }

    /// Replaces `old_reviewer_id` on an open pull request with a random
    /// available teammate of the old reviewer.
    ///
    /// The pull request row stays locked from the status check through the
    /// swap, so a concurrent merge or reassignment of the same pull request
    /// runs entirely before or after this one.
    ///
    /// # Errors
    ///
    /// Checked in order: [`ConflictKind::NotAssigned`] when the reviewer is
    /// not on the pull request, [`AssignmentError::NotFound`] when the pull
    /// request does not exist, [`ConflictKind::AlreadyMerged`] when it is
    /// merged, then [`ConflictKind::NoCandidate`] when nobody can take over.
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> AssignmentResult<Reassignment> {
        let id = PullRequestId::new(pull_request_id)?;
        let old_reviewer = UserId::new(old_reviewer_id)?;
        let selector = self.selector.clone();
        let context = (id.clone(), old_reviewer.clone());

        let outcome = self
            .run("reassign_reviewer", move |unit: &mut dyn UnitOfWork| {
                let locked = unit.lock_pull_request(&id)?;
                if !unit.is_reviewer_assigned(&id, &old_reviewer)? {
                    return Err(ConflictKind::NotAssigned.into());
                }
                let Some(status) = locked else {
                    return Err(not_found(EntityKind::PullRequest, &id));
                };
                if status.is_terminal() {
                    return Err(ConflictKind::AlreadyMerged.into());
                }

                let current = unit
                    .find_pull_request(&id)?
                    .ok_or_else(|| not_found(EntityKind::PullRequest, &id))?;
                let old_user = unit
                    .find_user(&old_reviewer)?
                    .ok_or_else(|| not_found(EntityKind::User, &old_reviewer))?;

                let mut exclude = Vec::with_capacity(current.reviewers().len() + 2);
                exclude.push(current.author_id().clone());
                exclude.extend(current.reviewers().iter().cloned());
                exclude.push(old_reviewer.clone());

                let Some(replacement) = selector
                    .select(unit, old_user.team_id(), &exclude, 1)?
                    .into_iter()
                    .next()
                else {
                    return Err(ConflictKind::NoCandidate.into());
                };

                unit.delete_reviewer(&id, &old_reviewer)?;
                unit.insert_reviewer(&id, &replacement)?;
                availability::release(unit, &old_reviewer)?;
                availability::occupy(unit, &replacement)?;

                let pull_request = unit
                    .find_pull_request(&id)?
                    .ok_or_else(|| not_found(EntityKind::PullRequest, &id))?;
                Ok(Reassignment {
                    pull_request,
                    replaced_by: replacement,
                })
            })
            .await;

        match &outcome {
            Ok(reassignment) => info!(
                pull_request = %context.0,
                old_reviewer = %context.1,
                new_reviewer = %reassignment.replaced_by,
                "reviewer reassigned"
            ),
            Err(AssignmentError::Conflict(kind)) => warn!(
                pull_request = %context.0,
                old_reviewer = %context.1,
                conflict = %kind,
                "reassignment rejected"
            ),
            Err(_) => {}
        }
        outcome
    }

    /// Merges a pull request and releases its reviewers.
    ///
    /// Merging an already merged pull request returns it unchanged. The
    /// reviewer set is kept as the record of who reviewed it.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::NotFound`] for an unknown id, or a store
    /// failure.
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> AssignmentResult<PullRequest> {
        let id = PullRequestId::new(pull_request_id)?;
        let clock = Arc::clone(&self.clock);

        let (pull_request, released) = self
            .run("merge_pull_request", move |unit: &mut dyn UnitOfWork| {
                let Some(status) = unit.lock_pull_request(&id)? else {
                    return Err(not_found(EntityKind::PullRequest, &id));
                };
                let released = if status.can_transition_to(PullRequestStatus::Merged) {
                    unit.mark_merged(&id, clock.utc())?;
                    let reviewers = unit
                        .find_pull_request(&id)?
                        .map(|merged| merged.reviewers().to_vec())
                        .unwrap_or_default();
                    let mut freed = Vec::with_capacity(reviewers.len());
                    for reviewer in reviewers {
                        if availability::release(unit, &reviewer)? {
                            freed.push(reviewer);
                        }
                    }
                    Some(freed)
                } else {
                    None
                };
                let pull_request = unit
                    .find_pull_request(&id)?
                    .ok_or_else(|| not_found(EntityKind::PullRequest, &id))?;
                Ok((pull_request, released))
            })
            .await?;

        match released {
            Some(freed) => info!(
                pull_request = %pull_request.id(),
                released = ?freed,
                "pull request merged"
            ),
            None => debug!(pull_request = %pull_request.id(), "pull request already merged"),
        }
        Ok(pull_request)
    }

    /// Returns open and total assignment counts per reviewer.
    ///
    /// # Errors
    ///
    /// Returns a store failure.
    pub async fn reviewer_statistics(&self) -> AssignmentResult<Vec<ReviewerLoad>> {
        self.run("reviewer_statistics", |unit: &mut dyn UnitOfWork| {
            unit.reviewer_loads().map_err(AssignmentError::from)
        })
        .await
    }
}

//! In-memory [`ReviewStore`] implementation.

use super::row_locks::{RowLocks, poisoned};
use super::state::{MemoryState, PullRequestRow, Write};
use crate::assignment::{
    domain::{
        NewTeamMember, PullRequest, PullRequestId, PullRequestStatus, PullRequestSummary,
        ReviewerLoad, TeamId, TeamName, User, UserId,
    },
    ports::{ReviewStore, StoreError, StoreResult, UnitOfWork},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Thread-safe in-memory review store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewStore {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<MemoryState>,
    locks: RowLocks,
    team_sequence: AtomicI32,
}

impl InMemoryReviewStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let cancel = CancellationToken::new();
        let abandon_on_drop = cancel.clone().drop_guard();

        let outcome = tokio::task::spawn_blocking(move || -> Result<T, E> {
            let mut unit = MemoryUnit::new(&shared, cancel);
            let value = work(&mut unit)?;
            unit.commit()?;
            Ok(value)
        })
        .await
        .map_err(|err| E::from(StoreError::persistence(err)))?;

        drop(abandon_on_drop.disarm());
        outcome
    }
}

/// Unit of work over the shared state. Dropping it without
/// [`MemoryUnit::commit`] discards the buffered writes.
struct MemoryUnit<'a> {
    shared: &'a Shared,
    journal: Vec<Write>,
    held_locks: Vec<PullRequestId>,
    cancel: CancellationToken,
}

impl<'a> MemoryUnit<'a> {
    const fn new(shared: &'a Shared, cancel: CancellationToken) -> Self {
        Self {
            shared,
            journal: Vec::new(),
            held_locks: Vec::new(),
            cancel,
        }
    }

    fn ensure_live(&self) -> StoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(())
    }

    /// Latest committed state with this unit's writes replayed on top.
    fn view(&self) -> StoreResult<MemoryState> {
        self.ensure_live()?;
        let mut view = self.shared.state.lock().map_err(poisoned)?.clone();
        for write in &self.journal {
            view.apply(write)?;
        }
        Ok(view)
    }

    fn record(&mut self, write: Write) -> StoreResult<()> {
        let mut view = self.view()?;
        view.apply(&write)?;
        self.journal.push(write);
        Ok(())
    }

    /// Publishes the journal. Cancellation is checked under the state mutex,
    /// so a unit abandoned while waiting for it commits nothing.
    fn commit(&mut self) -> StoreResult<()> {
        let mut committed = self.shared.state.lock().map_err(poisoned)?;
        self.ensure_live()?;
        let mut next = committed.clone();
        for write in &self.journal {
            next.apply(write)?;
        }
        *committed = next;
        self.journal.clear();
        Ok(())
    }
}

impl Drop for MemoryUnit<'_> {
    fn drop(&mut self) {
        self.shared.locks.release(&self.held_locks);
    }
}

impl UnitOfWork for MemoryUnit<'_> {
    fn find_team_id(&mut self, name: &TeamName) -> StoreResult<Option<TeamId>> {
        let view = self.view()?;
        Ok(view
            .teams
            .iter()
            .find(|(_, existing)| *existing == name)
            .map(|(id, _)| *id))
    }

    fn insert_team(&mut self, name: &TeamName) -> StoreResult<TeamId> {
        let id = TeamId::new(self.shared.team_sequence.fetch_add(1, Ordering::SeqCst) + 1);
        self.record(Write::InsertTeam {
            id,
            name: name.clone(),
        })?;
        Ok(id)
    }

    fn upsert_user(&mut self, team: TeamId, member: &NewTeamMember) -> StoreResult<()> {
        self.record(Write::UpsertUser {
            team,
            member: member.clone(),
        })
    }

    fn team_members(&mut self, team: TeamId) -> StoreResult<Vec<User>> {
        let view = self.view()?;
        Ok(view
            .users
            .iter()
            .filter(|(_, row)| row.team_id == team)
            .filter_map(|(id, _)| view.user(id))
            .collect())
    }

    fn find_user(&mut self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.view()?.user(id))
    }

    fn set_user_available(&mut self, id: &UserId, available: bool) -> StoreResult<bool> {
        if !self.view()?.users.contains_key(id) {
            return Ok(false);
        }
        self.record(Write::SetAvailable {
            user: id.clone(),
            available,
        })?;
        Ok(true)
    }

    fn available_team_members(
        &mut self,
        team: TeamId,
        exclude: &[UserId],
    ) -> StoreResult<Vec<UserId>> {
        let view = self.view()?;
        Ok(view
            .users
            .iter()
            .filter(|(id, row)| row.team_id == team && row.available && !exclude.contains(id))
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn has_open_reviews(&mut self, user: &UserId) -> StoreResult<bool> {
        let view = self.view()?;
        Ok(view
            .assignments()
            .any(|(pull_request, reviewer)| reviewer == user && view.is_open(pull_request)))
    }

    fn pull_request_exists(&mut self, id: &PullRequestId) -> StoreResult<bool> {
        Ok(self.view()?.pull_requests.contains_key(id))
    }

    fn insert_pull_request(&mut self, pull_request: &PullRequest) -> StoreResult<()> {
        self.record(Write::InsertPullRequest {
            id: pull_request.id().clone(),
            row: PullRequestRow {
                title: pull_request.title().clone(),
                author_id: pull_request.author_id().clone(),
                status: pull_request.status(),
                created_at: pull_request.created_at(),
                merged_at: pull_request.merged_at(),
            },
        })
    }

    fn lock_pull_request(&mut self, id: &PullRequestId) -> StoreResult<Option<PullRequestStatus>> {
        self.ensure_live()?;
        if !self.held_locks.contains(id) {
            self.shared.locks.acquire(id, &self.cancel)?;
            self.held_locks.push(id.clone());
        }
        Ok(self.view()?.pull_requests.get(id).map(|row| row.status))
    }

    fn find_pull_request(&mut self, id: &PullRequestId) -> StoreResult<Option<PullRequest>> {
        Ok(self.view()?.pull_request(id))
    }

    fn is_reviewer_assigned(
        &mut self,
        pull_request: &PullRequestId,
        user: &UserId,
    ) -> StoreResult<bool> {
        Ok(self.view()?.reviewers_of(pull_request).contains(user))
    }

    fn insert_reviewer(&mut self, pull_request: &PullRequestId, user: &UserId) -> StoreResult<()> {
        self.record(Write::InsertReviewer {
            pull_request: pull_request.clone(),
            user: user.clone(),
        })
    }

    fn delete_reviewer(
        &mut self,
        pull_request: &PullRequestId,
        user: &UserId,
    ) -> StoreResult<bool> {
        if !self.view()?.reviewers_of(pull_request).contains(user) {
            return Ok(false);
        }
        self.record(Write::DeleteReviewer {
            pull_request: pull_request.clone(),
            user: user.clone(),
        })?;
        Ok(true)
    }

    fn mark_merged(&mut self, id: &PullRequestId, merged_at: DateTime<Utc>) -> StoreResult<()> {
        self.record(Write::MarkMerged {
            id: id.clone(),
            merged_at,
        })
    }

    fn reviews_of(&mut self, user: &UserId) -> StoreResult<Vec<PullRequestSummary>> {
        let view = self.view()?;
        let mut reviews: Vec<PullRequest> = view
            .assignments()
            .filter(|(_, reviewer)| *reviewer == user)
            .filter_map(|(pull_request, _)| view.pull_request(pull_request))
            .collect();
        reviews.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().cmp(right.id()))
        });
        Ok(reviews.iter().map(PullRequest::summary).collect())
    }

    fn reviewer_loads(&mut self) -> StoreResult<Vec<ReviewerLoad>> {
        let view = self.view()?;
        let mut loads: BTreeMap<UserId, ReviewerLoad> = BTreeMap::new();
        for (pull_request, reviewer) in view.assignments() {
            let load = loads
                .entry(reviewer.clone())
                .or_insert_with(|| ReviewerLoad {
                    user_id: reviewer.clone(),
                    open_reviews: 0,
                    total_reviews: 0,
                });
            load.total_reviews += 1;
            if view.is_open(pull_request) {
                load.open_reviews += 1;
            }
        }
        Ok(loads.into_values().collect())
    }
}

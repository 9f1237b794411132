//! Row state and write replay for the in-memory store.

use crate::assignment::{
    domain::{
        NewTeamMember, PersistedPullRequestData, PullRequest, PullRequestId, PullRequestStatus,
        PullRequestTitle, TeamId, TeamName, User, UserId, Username,
    },
    ports::{StoreError, StoreResult},
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub(super) struct UserRow {
    pub(super) username: Username,
    pub(super) team_id: TeamId,
    pub(super) available: bool,
}

#[derive(Debug, Clone)]
pub(super) struct PullRequestRow {
    pub(super) title: PullRequestTitle,
    pub(super) author_id: UserId,
    pub(super) status: PullRequestStatus,
    pub(super) created_at: DateTime<Utc>,
    pub(super) merged_at: Option<DateTime<Utc>>,
}

/// Committed rows. Reviewer lists keep assignment order.
#[derive(Debug, Clone, Default)]
pub(super) struct MemoryState {
    pub(super) teams: BTreeMap<TeamId, TeamName>,
    pub(super) users: BTreeMap<UserId, UserRow>,
    pub(super) pull_requests: BTreeMap<PullRequestId, PullRequestRow>,
    pub(super) reviewers: BTreeMap<PullRequestId, Vec<UserId>>,
}

/// A buffered row write.
#[derive(Debug, Clone)]
pub(super) enum Write {
    InsertTeam {
        id: TeamId,
        name: TeamName,
    },
    UpsertUser {
        team: TeamId,
        member: NewTeamMember,
    },
    SetAvailable {
        user: UserId,
        available: bool,
    },
    InsertPullRequest {
        id: PullRequestId,
        row: PullRequestRow,
    },
    InsertReviewer {
        pull_request: PullRequestId,
        user: UserId,
    },
    DeleteReviewer {
        pull_request: PullRequestId,
        user: UserId,
    },
    MarkMerged {
        id: PullRequestId,
        merged_at: DateTime<Utc>,
    },
}

impl MemoryState {
    /// Applies one write, enforcing the same uniqueness rules as the
    /// relational schema.
    pub(super) fn apply(&mut self, write: &Write) -> StoreResult<()> {
        match write {
            Write::InsertTeam { id, name } => {
                if self.teams.values().any(|existing| existing == name) {
                    return Err(StoreError::DuplicateTeam(name.clone()));
                }
                self.teams.insert(*id, name.clone());
            }
            Write::UpsertUser { team, member } => {
                self.users.insert(
                    member.id.clone(),
                    UserRow {
                        username: member.username.clone(),
                        team_id: *team,
                        available: member.available,
                    },
                );
            }
            Write::SetAvailable { user, available } => {
                if let Some(row) = self.users.get_mut(user) {
                    row.available = *available;
                }
            }
            Write::InsertPullRequest { id, row } => {
                if self.pull_requests.contains_key(id) {
                    return Err(StoreError::DuplicatePullRequest(id.clone()));
                }
                self.pull_requests.insert(id.clone(), row.clone());
            }
            Write::InsertReviewer { pull_request, user } => {
                let assigned = self.reviewers.entry(pull_request.clone()).or_default();
                if assigned.contains(user) {
                    return Err(StoreError::persistence(std::io::Error::other(format!(
                        "reviewer {user} already assigned to {pull_request}"
                    ))));
                }
                assigned.push(user.clone());
            }
            Write::DeleteReviewer { pull_request, user } => {
                if let Some(assigned) = self.reviewers.get_mut(pull_request) {
                    assigned.retain(|reviewer| reviewer != user);
                }
            }
            Write::MarkMerged { id, merged_at } => {
                if let Some(row) = self.pull_requests.get_mut(id) {
                    row.status = PullRequestStatus::Merged;
                    row.merged_at = Some(*merged_at);
                }
            }
        }
        Ok(())
    }

    pub(super) fn user(&self, id: &UserId) -> Option<User> {
        let row = self.users.get(id)?;
        let team_name = self.teams.get(&row.team_id)?;
        Some(User::new(
            id.clone(),
            row.username.clone(),
            row.team_id,
            team_name.clone(),
            row.available,
        ))
    }

    pub(super) fn reviewers_of(&self, id: &PullRequestId) -> &[UserId] {
        self.reviewers.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub(super) fn pull_request(&self, id: &PullRequestId) -> Option<PullRequest> {
        let row = self.pull_requests.get(id)?;
        Some(PullRequest::from_persisted(PersistedPullRequestData {
            id: id.clone(),
            title: row.title.clone(),
            author_id: row.author_id.clone(),
            status: row.status,
            reviewers: self.reviewers_of(id).to_vec(),
            created_at: row.created_at,
            merged_at: row.merged_at,
        }))
    }

    /// Iterates `(pull request, reviewer)` assignment pairs.
    pub(super) fn assignments(&self) -> impl Iterator<Item = (&PullRequestId, &UserId)> {
        self.reviewers
            .iter()
            .flat_map(|(pull_request, users)| users.iter().map(move |user| (pull_request, user)))
    }

    pub(super) fn is_open(&self, id: &PullRequestId) -> bool {
        self.pull_requests
            .get(id)
            .is_some_and(|row| row.status == PullRequestStatus::Open)
    }
}

//! `PostgreSQL` [`ReviewStore`] implementation.

use super::{
    models::{
        NewPullRequestRow, NewReviewerRow, NewUserRow, PullRequestRow, ReviewerLoadRow, UserRow,
    },
    schema::{pr_reviewers, pull_requests, teams, users},
};
use crate::assignment::{
    domain::{
        NewTeamMember, PersistedPullRequestData, PullRequest, PullRequestId, PullRequestStatus,
        PullRequestSummary, PullRequestTitle, ReviewerLoad, TeamId, TeamName, User, UserId,
        Username,
    },
    ports::{ReviewStore, StoreError, StoreResult, UnitOfWork},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;
use tokio_util::sync::CancellationToken;

/// `PostgreSQL` connection pool type used by the review store.
pub type ReviewPgPool = Pool<ConnectionManager<PgConnection>>;

/// Idempotent schema for the review tables.
pub const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_review_tables/up.sql");

/// `PostgreSQL`-backed review store.
#[derive(Debug, Clone)]
pub struct PostgresReviewStore {
    pool: ReviewPgPool,
}

impl PostgresReviewStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ReviewPgPool) -> Self {
        Self { pool }
    }

    /// Creates the review tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the schema cannot be applied.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            connection
                .batch_execute(SCHEMA_SQL)
                .map_err(StoreError::persistence)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

/// Failure inside a Diesel transaction: either the caller's own error or a
/// driver error raised while committing or rolling back.
enum TransactionFailure<E> {
    Work(E),
    Driver(DieselError),
}

impl<E> From<DieselError> for TransactionFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Driver(err)
    }
}

impl<E: From<StoreError>> TransactionFailure<E> {
    fn into_error(self) -> E {
        match self {
            Self::Work(err) => err,
            Self::Driver(err) => E::from(StoreError::persistence(err)),
        }
    }
}

#[async_trait]
impl ReviewStore for PostgresReviewStore {
    async fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let cancel = CancellationToken::new();
        let abandon_on_drop = cancel.clone().drop_guard();

        let outcome = tokio::task::spawn_blocking(move || -> Result<T, E> {
            let mut pooled = pool
                .get()
                .map_err(|err| E::from(StoreError::persistence(err)))?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TransactionFailure<E>, _>(|tx| {
                    let mut unit = PgUnit {
                        connection: tx,
                        cancel: &cancel,
                    };
                    let value = work(&mut unit).map_err(TransactionFailure::Work)?;
                    unit.ensure_live()
                        .map_err(|err| TransactionFailure::Work(E::from(err)))?;
                    Ok(value)
                })
                .map_err(TransactionFailure::into_error)
        })
        .await
        .map_err(|err| E::from(StoreError::persistence(err)))?;

        drop(abandon_on_drop.disarm());
        outcome
    }
}

/// Unit of work bound to one open Diesel transaction.
struct PgUnit<'a> {
    connection: &'a mut PgConnection,
    cancel: &'a CancellationToken,
}

impl PgUnit<'_> {
    fn ensure_live(&self) -> StoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(())
    }
}

impl UnitOfWork for PgUnit<'_> {
    fn find_team_id(&mut self, name: &TeamName) -> StoreResult<Option<TeamId>> {
        self.ensure_live()?;
        let id = teams::table
            .filter(teams::name.eq(name.as_str()))
            .select(teams::id)
            .first::<i32>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?;
        Ok(id.map(TeamId::new))
    }

    fn insert_team(&mut self, name: &TeamName) -> StoreResult<TeamId> {
        self.ensure_live()?;
        let id = diesel::insert_into(teams::table)
            .values(teams::name.eq(name.as_str()))
            .returning(teams::id)
            .get_result::<i32>(self.connection)
            .map_err(|err| map_unique(err, || StoreError::DuplicateTeam(name.clone())))?;
        Ok(TeamId::new(id))
    }

    fn upsert_user(&mut self, team: TeamId, member: &NewTeamMember) -> StoreResult<()> {
        self.ensure_live()?;
        let row = NewUserRow {
            id: member.id.as_str(),
            username: member.username.as_str(),
            team_id: team.value(),
            is_active: member.available,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set((
                users::username.eq(excluded(users::username)),
                users::team_id.eq(excluded(users::team_id)),
                users::is_active.eq(excluded(users::is_active)),
            ))
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        Ok(())
    }

    fn team_members(&mut self, team: TeamId) -> StoreResult<Vec<User>> {
        self.ensure_live()?;
        let rows = users::table
            .inner_join(teams::table)
            .filter(users::team_id.eq(team.value()))
            .order(users::id.asc())
            .select((UserRow::as_select(), teams::name))
            .load::<(UserRow, String)>(self.connection)
            .map_err(StoreError::persistence)?;
        rows.into_iter()
            .map(|(row, team_name)| row_to_user(row, team_name))
            .collect()
    }

    fn find_user(&mut self, id: &UserId) -> StoreResult<Option<User>> {
        self.ensure_live()?;
        let row = users::table
            .inner_join(teams::table)
            .filter(users::id.eq(id.as_str()))
            .select((UserRow::as_select(), teams::name))
            .first::<(UserRow, String)>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?;
        row.map(|(user, team_name)| row_to_user(user, team_name))
            .transpose()
    }

    fn set_user_available(&mut self, id: &UserId, available: bool) -> StoreResult<bool> {
        self.ensure_live()?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.as_str())))
            .set(users::is_active.eq(available))
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        Ok(updated > 0)
    }

    fn available_team_members(
        &mut self,
        team: TeamId,
        exclude: &[UserId],
    ) -> StoreResult<Vec<UserId>> {
        self.ensure_live()?;
        let excluded_ids: Vec<&str> = exclude.iter().map(UserId::as_str).collect();
        let ids = users::table
            .filter(users::team_id.eq(team.value()))
            .filter(users::is_active.eq(true))
            .filter(users::id.ne_all(excluded_ids))
            .select(users::id)
            .load::<String>(self.connection)
            .map_err(StoreError::persistence)?;
        ids.into_iter()
            .map(|id| UserId::new(id).map_err(StoreError::persistence))
            .collect()
    }

    fn has_open_reviews(&mut self, user: &UserId) -> StoreResult<bool> {
        self.ensure_live()?;
        diesel::select(exists(
            pr_reviewers::table
                .inner_join(pull_requests::table)
                .filter(pr_reviewers::reviewer_id.eq(user.as_str()))
                .filter(pull_requests::status.eq(PullRequestStatus::Open.as_str())),
        ))
        .get_result::<bool>(self.connection)
        .map_err(StoreError::persistence)
    }

    fn pull_request_exists(&mut self, id: &PullRequestId) -> StoreResult<bool> {
        self.ensure_live()?;
        diesel::select(exists(
            pull_requests::table.filter(pull_requests::id.eq(id.as_str())),
        ))
        .get_result::<bool>(self.connection)
        .map_err(StoreError::persistence)
    }

    fn insert_pull_request(&mut self, pull_request: &PullRequest) -> StoreResult<()> {
        self.ensure_live()?;
        let row = NewPullRequestRow {
            id: pull_request.id().as_str(),
            title: pull_request.title().as_str(),
            author_id: pull_request.author_id().as_str(),
            status: pull_request.status().as_str(),
            created_at: pull_request.created_at(),
            merged_at: pull_request.merged_at(),
        };
        diesel::insert_into(pull_requests::table)
            .values(&row)
            .execute(self.connection)
            .map_err(|err| {
                map_unique(err, || {
                    StoreError::DuplicatePullRequest(pull_request.id().clone())
                })
            })?;
        Ok(())
    }

    fn lock_pull_request(&mut self, id: &PullRequestId) -> StoreResult<Option<PullRequestStatus>> {
        self.ensure_live()?;
        let status = pull_requests::table
            .filter(pull_requests::id.eq(id.as_str()))
            .select(pull_requests::status)
            .for_update()
            .first::<String>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?;
        status
            .map(|value| {
                PullRequestStatus::try_from(value.as_str()).map_err(StoreError::persistence)
            })
            .transpose()
    }

    fn find_pull_request(&mut self, id: &PullRequestId) -> StoreResult<Option<PullRequest>> {
        self.ensure_live()?;
        let row = pull_requests::table
            .filter(pull_requests::id.eq(id.as_str()))
            .select(PullRequestRow::as_select())
            .first::<PullRequestRow>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?;
        let Some(pull_request) = row else {
            return Ok(None);
        };

        let reviewer_ids = pr_reviewers::table
            .filter(pr_reviewers::pr_id.eq(id.as_str()))
            .order(pr_reviewers::id.asc())
            .select(pr_reviewers::reviewer_id)
            .load::<String>(self.connection)
            .map_err(StoreError::persistence)?;
        row_to_pull_request(pull_request, reviewer_ids).map(Some)
    }

    fn is_reviewer_assigned(
        &mut self,
        pull_request: &PullRequestId,
        user: &UserId,
    ) -> StoreResult<bool> {
        self.ensure_live()?;
        diesel::select(exists(
            pr_reviewers::table
                .filter(pr_reviewers::pr_id.eq(pull_request.as_str()))
                .filter(pr_reviewers::reviewer_id.eq(user.as_str())),
        ))
        .get_result::<bool>(self.connection)
        .map_err(StoreError::persistence)
    }

    fn insert_reviewer(&mut self, pull_request: &PullRequestId, user: &UserId) -> StoreResult<()> {
        self.ensure_live()?;
        diesel::insert_into(pr_reviewers::table)
            .values(&NewReviewerRow {
                pr_id: pull_request.as_str(),
                reviewer_id: user.as_str(),
            })
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        Ok(())
    }

    fn delete_reviewer(
        &mut self,
        pull_request: &PullRequestId,
        user: &UserId,
    ) -> StoreResult<bool> {
        self.ensure_live()?;
        let deleted = diesel::delete(
            pr_reviewers::table
                .filter(pr_reviewers::pr_id.eq(pull_request.as_str()))
                .filter(pr_reviewers::reviewer_id.eq(user.as_str())),
        )
        .execute(self.connection)
        .map_err(StoreError::persistence)?;
        Ok(deleted > 0)
    }

    fn mark_merged(&mut self, id: &PullRequestId, merged_at: DateTime<Utc>) -> StoreResult<()> {
        self.ensure_live()?;
        diesel::update(pull_requests::table.filter(pull_requests::id.eq(id.as_str())))
            .set((
                pull_requests::status.eq(PullRequestStatus::Merged.as_str()),
                pull_requests::merged_at.eq(Some(merged_at)),
            ))
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        Ok(())
    }

    fn reviews_of(&mut self, user: &UserId) -> StoreResult<Vec<PullRequestSummary>> {
        self.ensure_live()?;
        let rows = pr_reviewers::table
            .inner_join(pull_requests::table)
            .filter(pr_reviewers::reviewer_id.eq(user.as_str()))
            .order((pull_requests::created_at.asc(), pull_requests::id.asc()))
            .select(PullRequestRow::as_select())
            .load::<PullRequestRow>(self.connection)
            .map_err(StoreError::persistence)?;
        rows.into_iter()
            .map(|row| row_to_pull_request(row, Vec::new()).map(|pr| pr.summary()))
            .collect()
    }

    fn reviewer_loads(&mut self) -> StoreResult<Vec<ReviewerLoad>> {
        self.ensure_live()?;
        let rows = diesel::sql_query(concat!(
            "SELECT rv.reviewer_id AS user_id, ",
            "COUNT(*) FILTER (WHERE pr.status = 'OPEN') AS open_reviews, ",
            "COUNT(*) AS total_reviews ",
            "FROM pr_reviewers rv ",
            "JOIN pull_requests pr ON pr.id = rv.pr_id ",
            "GROUP BY rv.reviewer_id ",
            "ORDER BY rv.reviewer_id",
        ))
        .load::<ReviewerLoadRow>(self.connection)
        .map_err(StoreError::persistence)?;
        rows.into_iter().map(row_to_load).collect()
    }
}

fn map_unique(err: DieselError, duplicate: impl FnOnce() -> StoreError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => duplicate(),
        other => StoreError::persistence(other),
    }
}

fn row_to_user(row: UserRow, team_name: String) -> StoreResult<User> {
    Ok(User::new(
        UserId::new(row.id).map_err(StoreError::persistence)?,
        Username::new(row.username).map_err(StoreError::persistence)?,
        TeamId::new(row.team_id),
        TeamName::new(team_name).map_err(StoreError::persistence)?,
        row.is_active,
    ))
}

fn row_to_pull_request(row: PullRequestRow, reviewer_ids: Vec<String>) -> StoreResult<PullRequest> {
    let PullRequestRow {
        id,
        title,
        author_id,
        status,
        created_at,
        merged_at,
    } = row;

    let reviewers = reviewer_ids
        .into_iter()
        .map(|reviewer| UserId::new(reviewer).map_err(StoreError::persistence))
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(PullRequest::from_persisted(PersistedPullRequestData {
        id: PullRequestId::new(id).map_err(StoreError::persistence)?,
        title: PullRequestTitle::new(title).map_err(StoreError::persistence)?,
        author_id: UserId::new(author_id).map_err(StoreError::persistence)?,
        status: PullRequestStatus::try_from(status.as_str()).map_err(StoreError::persistence)?,
        reviewers,
        created_at,
        merged_at,
    }))
}

fn row_to_load(row: ReviewerLoadRow) -> StoreResult<ReviewerLoad> {
    Ok(ReviewerLoad {
        user_id: UserId::new(row.user_id).map_err(StoreError::persistence)?,
        open_reviews: u64::try_from(row.open_reviews).map_err(StoreError::persistence)?,
        total_reviews: u64::try_from(row.total_reviews).map_err(StoreError::persistence)?,
    })
}

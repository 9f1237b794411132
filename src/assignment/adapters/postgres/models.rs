//! Diesel row models for reviewer assignment persistence.

use super::schema::{pr_reviewers, pull_requests, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for users.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Owning team.
    pub team_id: i32,
    /// Availability flag.
    pub is_active: bool,
}

/// Insert model for users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    /// User identifier.
    pub id: &'a str,
    /// Display name.
    pub username: &'a str,
    /// Owning team.
    pub team_id: i32,
    /// Availability flag.
    pub is_active: bool,
}

/// Query result row for pull requests.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pull_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PullRequestRow {
    /// Pull request identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Author.
    pub author_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
}

/// Insert model for pull requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pull_requests)]
pub struct NewPullRequestRow<'a> {
    /// Pull request identifier.
    pub id: &'a str,
    /// Title.
    pub title: &'a str,
    /// Author.
    pub author_id: &'a str,
    /// Lifecycle status.
    pub status: &'a str,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
}

/// Insert model for reviewer assignments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pr_reviewers)]
pub struct NewReviewerRow<'a> {
    /// Reviewed pull request.
    pub pr_id: &'a str,
    /// Assigned reviewer.
    pub reviewer_id: &'a str,
}

/// Aggregated assignment counts per reviewer.
#[derive(Debug, Clone, QueryableByName)]
pub struct ReviewerLoadRow {
    /// Reviewer.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub user_id: String,
    /// Assignments on open pull requests.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub open_reviews: i64,
    /// All assignments.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total_reviews: i64,
}

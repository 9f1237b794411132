//! Diesel schema for reviewer assignment persistence.

diesel::table! {
    /// Teams; names are unique.
    teams (id) {
        /// Store-assigned team identifier.
        id -> Int4,
        /// Unique team name.
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    /// Users and their review availability.
    users (id) {
        /// Caller-supplied user identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Display name.
        #[max_length = 255]
        username -> Varchar,
        /// Owning team.
        team_id -> Int4,
        /// Availability for new review assignments.
        is_active -> Bool,
    }
}

diesel::table! {
    /// Pull requests and their lifecycle status.
    pull_requests (id) {
        /// Caller-supplied pull request identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Title.
        #[max_length = 1024]
        title -> Varchar,
        /// Author.
        #[max_length = 255]
        author_id -> Varchar,
        /// `OPEN` or `MERGED`.
        #[max_length = 16]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Merge timestamp.
        merged_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Reviewer assignments; the serial id preserves assignment order.
    pr_reviewers (id) {
        /// Assignment sequence number.
        id -> Int8,
        /// Reviewed pull request.
        #[max_length = 255]
        pr_id -> Varchar,
        /// Assigned reviewer.
        #[max_length = 255]
        reviewer_id -> Varchar,
    }
}

diesel::joinable!(users -> teams (team_id));
diesel::joinable!(pr_reviewers -> pull_requests (pr_id));

diesel::allow_tables_to_appear_in_same_query!(teams, users, pull_requests, pr_reviewers);

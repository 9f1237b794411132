//! User entity.

use super::{TeamId, TeamName, UserId, Username};
use serde::{Deserialize, Serialize};

/// A team member and their review availability.
///
/// `available` is true when the user holds no review on an open pull request,
/// unless an administrative override has set it directly since the last
/// assignment or release touching the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: Username,
    team_id: TeamId,
    team_name: TeamName,
    available: bool,
}

impl User {
    /// Creates a user view from persisted parts.
    #[must_use]
    pub const fn new(
        id: UserId,
        username: Username,
        team_id: TeamId,
        team_name: TeamName,
        available: bool,
    ) -> Self {
        Self {
            id,
            username,
            team_id,
            team_name,
            available,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the identifier of the owning team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the name of the owning team.
    #[must_use]
    pub const fn team_name(&self) -> &TeamName {
        &self.team_name
    }

    /// Returns whether the user may receive new review assignments.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }
}

//! Team aggregate and member registration values.

use super::{TeamId, TeamName, User, UserId, Username};
use serde::{Deserialize, Serialize};

/// A team together with its current members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: TeamName,
    members: Vec<User>,
}

impl Team {
    /// Creates a team view from persisted parts.
    #[must_use]
    pub const fn new(id: TeamId, name: TeamName, members: Vec<User>) -> Self {
        Self { id, name, members }
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the team name.
    #[must_use]
    pub const fn name(&self) -> &TeamName {
        &self.name
    }

    /// Returns the team members ordered by user id.
    #[must_use]
    pub fn members(&self) -> &[User] {
        &self.members
    }

    /// Returns the member with the given id, if present.
    #[must_use]
    pub fn member(&self, id: &UserId) -> Option<&User> {
        self.members.iter().find(|member| member.id() == id)
    }
}

/// Member supplied when registering a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeamMember {
    /// Caller-supplied user identifier.
    pub id: UserId,
    /// Display name.
    pub username: Username,
    /// Initial availability flag.
    pub available: bool,
}

impl NewTeamMember {
    /// Creates a member registration.
    #[must_use]
    pub const fn new(id: UserId, username: Username, available: bool) -> Self {
        Self {
            id,
            username,
            available,
        }
    }
}

//! Candidate selection for reviewer assignment.

use crate::assignment::{
    domain::{TeamId, UserId},
    ports::{RandomSource, StoreResult, UnitOfWork},
};
use std::sync::Arc;
use tracing::debug;

/// Picks reviewers uniformly at random from a team's available members.
///
/// Candidate reads take no team-wide lock, so two concurrent units can both
/// pick the same user.
#[derive(Debug)]
pub struct CandidateSelector<R: RandomSource> {
    random: Arc<R>,
}

impl<R: RandomSource> Clone for CandidateSelector<R> {
    fn clone(&self) -> Self {
        Self {
            random: Arc::clone(&self.random),
        }
    }
}

impl<R: RandomSource> CandidateSelector<R> {
    /// Creates a selector drawing permutations from `random`.
    #[must_use]
    pub const fn new(random: Arc<R>) -> Self {
        Self { random }
    }

    /// Returns up to `max_count` available members of `team` that are not in
    /// `exclude`, in random order. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::assignment::ports::StoreError`] when the candidate
    /// pool cannot be read.
    pub fn select(
        &self,
        unit: &mut dyn UnitOfWork,
        team: TeamId,
        exclude: &[UserId],
        max_count: usize,
    ) -> StoreResult<Vec<UserId>> {
        let mut candidates = unit.available_team_members(team, exclude)?;
        let eligible = candidates.len();
        self.random.shuffle(&mut candidates);
        candidates.truncate(max_count);
        debug!(
            team = team.value(),
            eligible,
            selected = candidates.len(),
            "selected review candidates"
        );
        Ok(candidates)
    }
}

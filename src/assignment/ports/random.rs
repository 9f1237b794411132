//! Randomness port used to order reviewer candidates.

use crate::assignment::domain::UserId;

/// Source of uniformly random permutations.
///
/// Implementations must be safe to share across request tasks; each call may
/// produce a different permutation of the same input.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Shuffles `ids` in place.
    fn shuffle(&self, ids: &mut [UserId]);
}

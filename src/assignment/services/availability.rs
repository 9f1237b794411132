//! Availability tracking for reviewers.
//!
//! Taking on a review always marks a user busy. Giving one up marks them
//! available again only when no other open pull request still lists them.

use crate::assignment::{
    domain::UserId,
    ports::{StoreResult, UnitOfWork},
};

/// Marks `user` unavailable after they were added as a reviewer.
///
/// # Errors
///
/// Returns [`crate::assignment::ports::StoreError`] when the flag cannot be
/// written.
pub fn occupy(unit: &mut dyn UnitOfWork, user: &UserId) -> StoreResult<()> {
    unit.set_user_available(user, false)?;
    Ok(())
}

/// Recomputes availability for `user` after they were removed as a reviewer
/// or a pull request they review was merged.
///
/// Returns whether the user became available.
///
/// # Errors
///
/// Returns [`crate::assignment::ports::StoreError`] when the workload cannot
/// be read or the flag cannot be written.
pub fn release(unit: &mut dyn UnitOfWork, user: &UserId) -> StoreResult<bool> {
    if unit.has_open_reviews(user)? {
        return Ok(false);
    }
    unit.set_user_available(user, true)
}

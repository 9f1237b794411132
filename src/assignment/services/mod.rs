//! Application services for reviewer assignment and rotation.

pub mod availability;
mod error_code;
mod lifecycle;
mod selector;

pub use error_code::ErrorCode;
pub use lifecycle::{
    AssignmentError, AssignmentResult, ConflictKind, CreatePullRequestRequest, CreateTeamRequest,
    DEFAULT_OPERATION_TIMEOUT, EntityKind, Reassignment, ReviewAssignmentService, UserReviews,
};
pub use selector::CandidateSelector;

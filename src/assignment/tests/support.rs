//! Shared fixtures for assignment service tests.

use crate::assignment::{
    adapters::{memory::InMemoryReviewStore, random::SeededRandom},
    domain::{PullRequestId, TeamName, UserId},
    ports::{RandomSource, ReviewStore, StoreError, UnitOfWork},
    services::{CreateTeamRequest, ReviewAssignmentService},
};
use mockable::DefaultClock;
use std::sync::Arc;

pub(super) type TestService =
    ReviewAssignmentService<InMemoryReviewStore, DefaultClock, SeededRandom>;

pub(super) fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

pub(super) fn pr_id(id: &str) -> PullRequestId {
    PullRequestId::new(id).expect("valid pull request id")
}

pub(super) fn service_over<R: RandomSource + 'static>(
    store: &InMemoryReviewStore,
    random: R,
) -> ReviewAssignmentService<InMemoryReviewStore, DefaultClock, R> {
    ReviewAssignmentService::new(
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
        Arc::new(random),
    )
}

pub(super) fn seeded_service(store: &InMemoryReviewStore) -> TestService {
    service_over(store, SeededRandom::new(42))
}

/// Registers `team` with every listed member available.
pub(super) async fn register_team<R: RandomSource + 'static>(
    service: &ReviewAssignmentService<InMemoryReviewStore, DefaultClock, R>,
    team: &str,
    members: &[&str],
) {
    let request = members
        .iter()
        .fold(CreateTeamRequest::new(team), |request, member| {
            request.with_member(*member, format!("name-{member}"), true)
        });
    service
        .create_team(request)
        .await
        .expect("team registration should succeed");
}

/// Returns every member of `teams` whose availability flag disagrees with
/// their open review workload.
pub(super) async fn availability_violations(
    store: &InMemoryReviewStore,
    teams: &[&str],
) -> Vec<UserId> {
    let names: Vec<TeamName> = teams
        .iter()
        .map(|team| TeamName::new(*team).expect("valid team name"))
        .collect();
    store
        .in_transaction(move |unit: &mut dyn UnitOfWork| {
            let mut violations = Vec::new();
            for name in &names {
                let Some(team) = unit.find_team_id(name)? else {
                    continue;
                };
                for member in unit.team_members(team)? {
                    let busy = unit.has_open_reviews(member.id())?;
                    if member.is_available() == busy {
                        violations.push(member.id().clone());
                    }
                }
            }
            Ok::<_, StoreError>(violations)
        })
        .await
        .expect("availability scan should succeed")
}

/// Returns the availability flag of `id`.
pub(super) async fn is_available(store: &InMemoryReviewStore, user_id: &str) -> bool {
    let id = user(user_id);
    store
        .in_transaction(move |unit: &mut dyn UnitOfWork| unit.find_user(&id))
        .await
        .expect("user lookup should succeed")
        .expect("user exists")
        .is_available()
}

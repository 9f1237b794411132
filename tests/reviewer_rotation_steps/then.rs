//! Then steps for reviewer rotation BDD scenarios.

use super::world::{RotationWorld, run_async, split_ids};
use eyre::WrapErr;
use review_rotation::assignment::{
    domain::{PullRequest, PullRequestStatus, UserId},
    services::{AssignmentError, ConflictKind},
};
use rstest_bdd_macros::then;

fn reviewers_of(world: &RotationWorld, id: &str) -> Result<Vec<String>, eyre::Report> {
    let pull_request: PullRequest =
        run_async(world.service.get_pull_request(id)).wrap_err("load pull request")?;
    Ok(pull_request
        .reviewers()
        .iter()
        .map(ToString::to_string)
        .collect())
}

fn expect_conflict(world: &RotationWorld, expected: ConflictKind) -> Result<(), eyre::Report> {
    let result = world
        .last_reassign_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing reassignment result in scenario world"))?;
    match result {
        Err(AssignmentError::Conflict(kind)) if *kind == expected => Ok(()),
        other => Err(eyre::eyre!("expected {expected:?} conflict, got {other:?}")),
    }
}

#[then(r#"pull request "{id}" has {count:usize} reviewers"#)]
fn reviewer_count(world: &mut RotationWorld, id: String, count: usize) -> Result<(), eyre::Report> {
    let reviewers = reviewers_of(world, &id)?;
    if reviewers.len() != count {
        return Err(eyre::eyre!(
            "expected {count} reviewers on {id}, found {reviewers:?}"
        ));
    }
    Ok(())
}

#[then(r#"the reviewers of "{id}" are drawn from "{pool}""#)]
fn reviewers_drawn_from(
    world: &mut RotationWorld,
    id: String,
    pool: String,
) -> Result<(), eyre::Report> {
    let allowed = split_ids(&pool);
    let reviewers = reviewers_of(world, &id)?;
    if let Some(stray) = reviewers.iter().find(|reviewer| !allowed.contains(reviewer)) {
        return Err(eyre::eyre!("reviewer {stray} is outside {allowed:?}"));
    }
    Ok(())
}

#[then(r#""{author}" is not a reviewer of "{id}""#)]
fn author_not_reviewer(
    world: &mut RotationWorld,
    author: String,
    id: String,
) -> Result<(), eyre::Report> {
    if reviewers_of(world, &id)?.contains(&author) {
        return Err(eyre::eyre!("{author} reviews their own pull request {id}"));
    }
    Ok(())
}

#[then(r#"the reviewers of "{id}" are exactly "{expected}""#)]
fn reviewers_exactly(
    world: &mut RotationWorld,
    id: String,
    expected: String,
) -> Result<(), eyre::Report> {
    let reviewers = reviewers_of(world, &id)?;
    if reviewers != split_ids(&expected) {
        return Err(eyre::eyre!("expected reviewers {expected}, found {reviewers:?}"));
    }
    Ok(())
}

#[then("the reassignment fails because no candidate is available")]
fn reassignment_without_candidate(world: &mut RotationWorld) -> Result<(), eyre::Report> {
    expect_conflict(world, ConflictKind::NoCandidate)
}

#[then("the reassignment fails because the pull request is merged")]
fn reassignment_on_merged(world: &mut RotationWorld) -> Result<(), eyre::Report> {
    expect_conflict(world, ConflictKind::AlreadyMerged)
}

#[then(r#"pull request "{id}" is merged with an unchanged merge timestamp"#)]
fn merged_once(world: &mut RotationWorld, id: String) -> Result<(), eyre::Report> {
    let first = world
        .first_merge
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing first merge in scenario world"))?;
    let last = world
        .last_merge
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing repeat merge in scenario world"))?;
    if first.status() != PullRequestStatus::Merged || first.merged_at().is_none() {
        return Err(eyre::eyre!("{id} was not merged: {first:?}"));
    }
    if last.merged_at() != first.merged_at() {
        return Err(eyre::eyre!(
            "merge timestamp of {id} changed from {:?} to {:?}",
            first.merged_at(),
            last.merged_at()
        ));
    }
    Ok(())
}

#[then(r#""{user}" is available in team "{team}""#)]
fn user_is_available(
    world: &mut RotationWorld,
    user: String,
    team: String,
) -> Result<(), eyre::Report> {
    let roster = run_async(world.service.get_team(&team)).wrap_err("load team")?;
    let id = UserId::new(user.as_str())?;
    let member = roster
        .member(&id)
        .ok_or_else(|| eyre::eyre!("{user} is not a member of {team}"))?;
    if !member.is_available() {
        return Err(eyre::eyre!("{user} is not available"));
    }
    Ok(())
}

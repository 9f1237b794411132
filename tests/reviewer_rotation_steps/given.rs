//! Given steps for reviewer rotation BDD scenarios.

use super::world::{RotationWorld, run_async, split_ids};
use eyre::WrapErr;
use review_rotation::assignment::services::{CreatePullRequestRequest, CreateTeamRequest};
use rstest_bdd_macros::given;

#[given(r#"a team "{team}" with available members "{members}""#)]
fn team_with_available_members(
    world: &mut RotationWorld,
    team: String,
    members: String,
) -> Result<(), eyre::Report> {
    let request = split_ids(&members)
        .into_iter()
        .fold(CreateTeamRequest::new(team), |request, id| {
            let username = format!("user {id}");
            request.with_member(id, username, true)
        });
    run_async(world.service.create_team(request)).wrap_err("register scenario team")?;
    Ok(())
}

#[given(r#""{author}" has opened pull request "{id}""#)]
fn pull_request_opened(
    world: &mut RotationWorld,
    author: String,
    id: String,
) -> Result<(), eyre::Report> {
    run_async(
        world
            .service
            .create_pull_request(CreatePullRequestRequest::new(id, "feat", author)),
    )
    .wrap_err("open scenario pull request")?;
    Ok(())
}

#[given(r#"pull request "{id}" has been merged"#)]
fn pull_request_already_merged(world: &mut RotationWorld, id: String) -> Result<(), eyre::Report> {
    run_async(world.service.merge_pull_request(&id)).wrap_err("merge scenario pull request")?;
    Ok(())
}

//! When steps for reviewer rotation BDD scenarios.

use super::world::{RotationWorld, run_async};
use eyre::WrapErr;
use review_rotation::assignment::services::CreatePullRequestRequest;
use rstest_bdd_macros::when;

#[when(r#""{author}" opens pull request "{id}" titled "{title}""#)]
fn open_pull_request(
    world: &mut RotationWorld,
    author: String,
    id: String,
    title: String,
) -> Result<(), eyre::Report> {
    run_async(
        world
            .service
            .create_pull_request(CreatePullRequestRequest::new(id, title, author)),
    )
    .wrap_err("open pull request")?;
    Ok(())
}

#[when(r#"reviewer "{reviewer}" is reassigned on "{id}""#)]
fn reassign_reviewer(world: &mut RotationWorld, reviewer: String, id: String) {
    world.last_reassign_result = Some(run_async(world.service.reassign_reviewer(&id, &reviewer)));
}

#[when(r#"the first reviewer of "{id}" is reassigned"#)]
fn reassign_first_reviewer(world: &mut RotationWorld, id: String) -> Result<(), eyre::Report> {
    let pull_request =
        run_async(world.service.get_pull_request(&id)).wrap_err("load pull request")?;
    let reviewer = pull_request
        .reviewers()
        .first()
        .cloned()
        .ok_or_else(|| eyre::eyre!("pull request {id} has no reviewers"))?;
    world.last_reassign_result = Some(run_async(
        world.service.reassign_reviewer(&id, reviewer.as_str()),
    ));
    Ok(())
}

#[when(r#"pull request "{id}" is merged"#)]
fn merge_pull_request(world: &mut RotationWorld, id: String) -> Result<(), eyre::Report> {
    let merged = run_async(world.service.merge_pull_request(&id)).wrap_err("merge")?;
    world.first_merge = Some(merged);
    Ok(())
}

#[when(r#"pull request "{id}" is merged again"#)]
fn merge_pull_request_again(world: &mut RotationWorld, id: String) -> Result<(), eyre::Report> {
    let merged = run_async(world.service.merge_pull_request(&id)).wrap_err("repeat merge")?;
    world.last_merge = Some(merged);
    Ok(())
}

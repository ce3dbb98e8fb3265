//! When steps for job execution BDD scenarios.

use super::world::{JobExecutionWorld, run_async};
use eyre::WrapErr;
use lasertrack::shop::domain::{ExecutionChange, JobStatus, LogFormChange};
use rstest_bdd_macros::when;

fn save(world: &mut JobExecutionWorld) -> Result<(), eyre::Report> {
    let mut session = world
        .session
        .take()
        .ok_or_else(|| eyre::eyre!("no operator session in scenario world"))?;
    let result = run_async(world.execution.save(&mut session));
    world.session = Some(session);
    world.last_save = Some(result);
    Ok(())
}

#[when(r#"the operator names the program "{name}""#)]
fn names_program(world: &mut JobExecutionWorld, name: String) -> Result<(), eyre::Report> {
    let mut session = world
        .session
        .take()
        .ok_or_else(|| eyre::eyre!("no operator session in scenario world"))?;
    session.apply(ExecutionChange::ProgramName(name));
    let created = run_async(world.execution.create_program(&mut session));
    world.session = Some(session);
    created.wrap_err("create program")?;
    Ok(())
}

#[when(r#"operator "{name}" saves without a start meter"#)]
fn saves_without_start(world: &mut JobExecutionWorld, name: String) -> Result<(), eyre::Report> {
    world
        .session_mut()?
        .apply(ExecutionChange::Log(LogFormChange::OperatorName(name)));
    save(world)
}

#[when(r#"operator "{name}" saves with start meter "{meter}""#)]
fn saves_with_start(
    world: &mut JobExecutionWorld,
    name: String,
    meter: String,
) -> Result<(), eyre::Report> {
    let session = world.session_mut()?;
    session.apply(ExecutionChange::Log(LogFormChange::OperatorName(name)));
    session.apply(ExecutionChange::Log(LogFormChange::StartMeter(meter)));
    save(world)
}

#[when(r#"the operator finishes at meter "{meter}" with {actual:u32} produced and {rejected:u32} rejected"#)]
fn finishes(
    world: &mut JobExecutionWorld,
    meter: String,
    actual: u32,
    rejected: u32,
) -> Result<(), eyre::Report> {
    let session = world.session_mut()?;
    let detail_id = session
        .lines()
        .first()
        .map(|line| line.detail.id)
        .ok_or_else(|| eyre::eyre!("job has no detail lines"))?;
    session.apply(ExecutionChange::Log(LogFormChange::EndMeter(meter)));
    session.apply(ExecutionChange::Log(LogFormChange::CuttingTime("30".to_owned())));
    session.apply(ExecutionChange::DetailActual(detail_id, actual.to_string()));
    session.apply(ExecutionChange::DetailRejected(detail_id, rejected.to_string()));
    session.apply(ExecutionChange::Status(JobStatus::Done));
    save(world)
}

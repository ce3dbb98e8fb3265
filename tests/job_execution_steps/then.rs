//! Then steps for job execution BDD scenarios.

use super::world::{JobExecutionWorld, run_async};
use eyre::WrapErr;
use lasertrack::notification::{domain::NotificationKind, ports::NotificationRepository};
use lasertrack::shop::{
    domain::{JobStatus, ShopDomainError},
    ports::JobRepository,
    services::ShopServiceError,
};
use rstest_bdd_macros::then;

fn expect_rejection(
    world: &JobExecutionWorld,
    expected: &ShopDomainError,
) -> Result<(), eyre::Report> {
    let result = world
        .last_save
        .as_ref()
        .ok_or_else(|| eyre::eyre!("nothing saved yet"))?;
    match result {
        Err(ShopServiceError::Domain(found)) if found == expected => Ok(()),
        other => Err(eyre::eyre!("expected {expected:?}, got {other:?}")),
    }
}

#[then(r#"the job status is "{status}""#)]
fn job_status_is(world: &JobExecutionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = JobStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let job_id = world.job_id.ok_or_else(|| eyre::eyre!("no job submitted"))?;
    let stored = run_async(world.store.find_job(job_id))
        .wrap_err("load job")?
        .ok_or_else(|| eyre::eyre!("job {job_id} missing"))?;
    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            stored.status().as_str()
        ));
    }
    Ok(())
}

#[then("the save is rejected for a missing operator or start meter")]
fn rejected_for_missing_start(world: &JobExecutionWorld) -> Result<(), eyre::Report> {
    expect_rejection(world, &ShopDomainError::MissingOperatorOrStartMeter)
}

#[then("the save is rejected for an end meter not above the start")]
fn rejected_for_end_meter(world: &JobExecutionWorld) -> Result<(), eyre::Report> {
    expect_rejection(world, &ShopDomainError::EndMeterNotAboveStart)
}

#[then("the log has a start time and no end time")]
fn log_started(world: &JobExecutionWorld) -> Result<(), eyre::Report> {
    let log = &world.last_outcome()?.log;
    if log.start_time.is_none() || log.end_time.is_some() {
        return Err(eyre::eyre!("unexpected log timestamps: {log:?}"));
    }
    Ok(())
}

#[then("the log has an end time")]
fn log_ended(world: &JobExecutionWorld) -> Result<(), eyre::Report> {
    let log = &world.last_outcome()?.log;
    if log.end_time.is_none() {
        return Err(eyre::eyre!("log has no end time: {log:?}"));
    }
    Ok(())
}

#[then(r#"a "{kind}" notification mentions "{text}""#)]
fn notification_mentions(
    world: &JobExecutionWorld,
    kind: String,
    text: String,
) -> Result<(), eyre::Report> {
    let stored = run_async(world.notifications.list_recent(10)).wrap_err("list notifications")?;
    let found = stored.iter().any(|notification| {
        notification.kind.as_str() == kind && notification.message.contains(&text)
    });
    if !found {
        return Err(eyre::eyre!(
            "no {kind} notification mentioning {text} in {stored:?}"
        ));
    }
    if kind == NotificationKind::JobCompleted.as_str() && world.last_outcome()?.completion.is_none() {
        return Err(eyre::eyre!("save did not report a completion"));
    }
    Ok(())
}

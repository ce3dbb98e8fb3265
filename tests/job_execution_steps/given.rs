//! Given steps for job execution BDD scenarios.

use std::sync::Arc;

use super::world::{JobExecutionWorld, run_async};
use eyre::WrapErr;
use lasertrack::shop::{
    domain::{ArticleDraft, ExecutionChange, JobDraft},
    ports::ArticleRepository,
    services::JobSubmissionService,
};
use mockable::DefaultClock;
use rstest_bdd_macros::given;

#[given(r#"a submitted job for article "{number}" with {pieces:i64} pieces"#)]
fn submitted_job(
    world: &mut JobExecutionWorld,
    number: String,
    pieces: i64,
) -> Result<(), eyre::Report> {
    let draft = ArticleDraft::new(number, "Bracket", 3.0, "S235", None)
        .map_err(|err| eyre::eyre!("invalid article in scenario: {err}"))?;
    let article = run_async(world.store.insert_article(&draft)).wrap_err("insert article")?;
    let mut job = JobDraft::default();
    job.add_line(article, pieces)
        .map_err(|err| eyre::eyre!("invalid job line in scenario: {err}"))?;
    let submission = JobSubmissionService::new(
        Arc::clone(&world.store),
        Arc::clone(&world.notifications),
        Arc::new(DefaultClock),
    );
    let submitted = run_async(submission.submit(&job)).wrap_err("submit job")?;
    let job_id = submitted.job.id();
    world.job_id = Some(job_id);
    world.session = Some(run_async(world.execution.open(job_id)).wrap_err("open job")?);
    Ok(())
}

#[given(r#"the program "{name}" exists"#)]
fn program_exists(world: &mut JobExecutionWorld, name: String) -> Result<(), eyre::Report> {
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

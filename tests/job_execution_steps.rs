//! Behaviour tests for operator job execution.

#[path = "job_execution_steps/mod.rs"]
mod job_execution_steps_defs;

use job_execution_steps_defs::world::{JobExecutionWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/job_execution.feature",
    name = "Naming the program starts the job"
)]
#[tokio::test(flavor = "multi_thread")]
async fn naming_the_program_starts_the_job(world: JobExecutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/job_execution.feature",
    name = "A first save needs the operator and the start meter"
)]
#[tokio::test(flavor = "multi_thread")]
async fn first_save_needs_operator_and_start_meter(world: JobExecutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/job_execution.feature",
    name = "Completing a job over two saves"
)]
#[tokio::test(flavor = "multi_thread")]
async fn completing_a_job_over_two_saves(world: JobExecutionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/job_execution.feature",
    name = "Completion needs the end meter above the start"
)]
#[tokio::test(flavor = "multi_thread")]
async fn completion_needs_end_meter_above_start(world: JobExecutionWorld) {
    let _ = world;
}

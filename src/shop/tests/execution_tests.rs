//! Job execution service tests: program creation, the save guard and the
//! write order of a save.

use std::sync::Arc;

use super::faulty_store::{Fault, FaultyStore};
use crate::navigation::Route;
use crate::notification::{
    adapters::memory::InMemoryNotificationStore, domain::NotificationKind,
    ports::NotificationRepository,
};
use crate::shop::{
    adapters::memory::InMemoryShopStore,
    domain::{
        ArticleDraft, ExecutionChange, JobDraft, JobId, JobStatus, LogFormChange,
        ShopDomainError,
    },
    ports::{ArticleRepository, CuttingLogRepository, JobDetailRepository, JobRepository},
    services::{
        COMPLETION_REDIRECT_DELAY, ExecutionSession, JobExecutionService, JobSubmissionService,
        SaveStep, ShopServiceError,
    },
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type Execution = JobExecutionService<InMemoryShopStore, InMemoryNotificationStore, DefaultClock>;

struct Floor {
    store: Arc<InMemoryShopStore>,
    notifications: Arc<InMemoryNotificationStore>,
    execution: Execution,
    job_id: JobId,
}

#[fixture]
async fn floor() -> Floor {
    let store = Arc::new(InMemoryShopStore::new());
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let clock = Arc::new(DefaultClock);
    let article = store
        .insert_article(&ArticleDraft::new("A-100", "Bracket", 3.0, "S235", None).expect("draft"))
        .await
        .expect("article");
    let submission =
        JobSubmissionService::new(Arc::clone(&store), Arc::clone(&notifications), Arc::clone(&clock));
    let mut draft = JobDraft::default();
    draft.add_line(article, 5).expect("line");
    let submitted = submission.submit(&draft).await.expect("submit");
    Floor {
        execution: JobExecutionService::new(Arc::clone(&store), Arc::clone(&notifications), clock),
        store,
        notifications,
        job_id: submitted.job.id(),
    }
}

/// Execution service over the floor's store that refuses one write.
fn faulty_execution(
    floor: &Floor,
    fault: Fault,
) -> JobExecutionService<FaultyStore, InMemoryNotificationStore, DefaultClock> {
    JobExecutionService::new(
        Arc::new(FaultyStore::failing(floor.store.as_ref().clone(), fault)),
        Arc::clone(&floor.notifications),
        Arc::new(DefaultClock),
    )
}

fn log_change(session: &mut ExecutionSession, change: LogFormChange) {
    session.apply(ExecutionChange::Log(change));
}

async fn started(floor: &Floor) -> ExecutionSession {
    let mut session = floor.execution.open(floor.job_id).await.expect("open");
    session.apply(ExecutionChange::ProgramName("sheet1.nc".to_owned()));
    floor
        .execution
        .create_program(&mut session)
        .await
        .expect("program");
    session
}

#[rstest]
#[tokio::test]
async fn creating_the_program_starts_a_queued_job(#[future] floor: Floor) {
    let floor = floor.await;
    let session = started(&floor).await;

    assert_eq!(session.job().status(), JobStatus::InProgress);
    let stored = floor
        .store
        .find_job(floor.job_id)
        .await
        .expect("find")
        .expect("job");
    assert_eq!(stored.status(), JobStatus::InProgress);
}

#[rstest]
#[tokio::test]
async fn second_program_is_rejected(#[future] floor: Floor) {
    let floor = floor.await;
    let mut session = started(&floor).await;

    let result = floor.execution.create_program(&mut session).await;

    assert!(matches!(
        result,
        Err(ShopServiceError::Domain(ShopDomainError::ProgramAlreadyExists(_)))
    ));
}

#[rstest]
#[tokio::test]
async fn save_without_program_writes_nothing(#[future] floor: Floor) {
    let floor = floor.await;
    let mut session = floor.execution.open(floor.job_id).await.expect("open");
    log_change(&mut session, LogFormChange::OperatorName("Ivan".to_owned()));
    log_change(&mut session, LogFormChange::StartMeter("10".to_owned()));

    let result = floor.execution.save(&mut session).await;

    assert!(matches!(
        result,
        Err(ShopServiceError::Domain(ShopDomainError::NoProgram))
    ));
    assert!(session.log().is_none());
}

#[rstest]
#[tokio::test]
async fn first_save_needs_operator_and_start_meter(#[future] floor: Floor) {
    let floor = floor.await;
    let mut session = started(&floor).await;
    log_change(&mut session, LogFormChange::OperatorName("Ivan".to_owned()));

    let result = floor.execution.save(&mut session).await;

    assert!(matches!(
        result,
        Err(ShopServiceError::Domain(ShopDomainError::MissingOperatorOrStartMeter))
    ));
}

#[rstest]
#[tokio::test]
async fn later_saves_update_the_same_log(#[future] floor: Floor) {
    let floor = floor.await;
    let mut session = started(&floor).await;
    log_change(&mut session, LogFormChange::OperatorName("Ivan".to_owned()));
    log_change(&mut session, LogFormChange::StartMeter("10.0".to_owned()));
    let first = floor.execution.save(&mut session).await.expect("first save");
    assert!(first.log.start_time.is_some());
    assert!(first.log.end_time.is_none());

    log_change(&mut session, LogFormChange::CuttingTime("40".to_owned()));
    let second = floor.execution.save(&mut session).await.expect("second save");

    assert_eq!(second.log.id, first.log.id);
    assert!(second.log.end_time.is_some());
    let logs = floor
        .store
        .list_logs(first.log.program_id)
        .await
        .expect("logs");
    assert_eq!(logs.len(), 1);
}

#[rstest]
#[case("10.0")]
#[case("9.5")]
#[tokio::test]
async fn completion_requires_end_above_start(#[future] floor: Floor, #[case] end: &str) {
    let floor = floor.await;
    let mut session = started(&floor).await;
    log_change(&mut session, LogFormChange::OperatorName("Ivan".to_owned()));
    log_change(&mut session, LogFormChange::StartMeter("10.0".to_owned()));
    log_change(&mut session, LogFormChange::EndMeter(end.to_owned()));
    session.apply(ExecutionChange::Status(JobStatus::Done));

    let result = floor.execution.save(&mut session).await;

    assert!(matches!(
        result,
        Err(ShopServiceError::Domain(ShopDomainError::EndMeterNotAboveStart))
    ));
    assert_eq!(session.job().status(), JobStatus::InProgress);
}

#[rstest]
#[tokio::test]
async fn completion_records_counts_and_notifies(#[future] floor: Floor) {
    let floor = floor.await;
    let mut session = started(&floor).await;
    let detail_id = session.lines().first().expect("detail line").detail.id;
    log_change(&mut session, LogFormChange::OperatorName("Ivan".to_owned()));
    log_change(&mut session, LogFormChange::StartMeter("10.0".to_owned()));
    log_change(&mut session, LogFormChange::EndMeter("15.5".to_owned()));
    log_change(&mut session, LogFormChange::PreparationTime("15".to_owned()));
    log_change(&mut session, LogFormChange::CuttingTime("30".to_owned()));
    session.apply(ExecutionChange::DetailActual(detail_id, "5".to_owned()));
    session.apply(ExecutionChange::DetailRejected(detail_id, "1".to_owned()));
    session.apply(ExecutionChange::Status(JobStatus::Done));

    let outcome = floor.execution.save(&mut session).await.expect("save");

    assert_eq!(outcome.status_change, Some(JobStatus::Done));
    let completion = outcome.completion.expect("completion");
    assert_eq!(completion.redirect.delay, COMPLETION_REDIRECT_DELAY);
    assert_eq!(completion.redirect.route, Route::journal_for_job(floor.job_id));
    let notification = completion.notification.expect("notification");
    assert_eq!(notification.kind, NotificationKind::JobCompleted);
    assert_eq!(notification.job_id, Some(floor.job_id));
    assert!(notification.message.contains("Ivan"));
    assert!(notification.message.contains("45"));

    let reopened = floor.execution.open(floor.job_id).await.expect("reopen");
    let counts = reopened.lines().first().expect("line").detail.counts;
    assert_eq!(counts.quantity_actual, Some(5));
    assert_eq!(counts.rejection_count, Some(1));
    assert_eq!(reopened.job().status(), JobStatus::Done);
}

#[rstest]
#[tokio::test]
async fn saving_a_finished_job_again_does_not_notify_twice(#[future] floor: Floor) {
    let floor = floor.await;
    let mut session = started(&floor).await;
    log_change(&mut session, LogFormChange::OperatorName("Ivan".to_owned()));
    log_change(&mut session, LogFormChange::StartMeter("10".to_owned()));
    log_change(&mut session, LogFormChange::EndMeter("12".to_owned()));
    session.apply(ExecutionChange::Status(JobStatus::Done));
    floor.execution.save(&mut session).await.expect("complete");

    log_change(&mut session, LogFormChange::CuttingTime("20".to_owned()));
    let again = floor.execution.save(&mut session).await.expect("edit after completion");

    assert!(again.completion.is_none());
    let completed = floor
        .notifications
        .list_recent(10)
        .await
        .expect("notifications")
        .into_iter()
        .filter(|notification| notification.kind == NotificationKind::JobCompleted)
        .count();
    assert_eq!(completed, 1);
}

#[rstest]
#[tokio::test]
async fn rename_requires_a_name(#[future] floor: Floor) {
    let floor = floor.await;
    let mut session = started(&floor).await;
    session.apply(ExecutionChange::ProgramName("   ".to_owned()));

    let result = floor.execution.rename_program(&mut session).await;

    assert!(matches!(
        result,
        Err(ShopServiceError::Domain(ShopDomainError::EmptyProgramFileName))
    ));

    session.apply(ExecutionChange::ProgramName("sheet2.nc".to_owned()));
    let renamed = floor
        .execution
        .rename_program(&mut session)
        .await
        .expect("rename");
    assert_eq!(renamed.file_name.as_str(), "sheet2.nc");
}

#[rstest]
#[case(Fault::DetailCounts, SaveStep::Log)]
#[case(Fault::JobStatus, SaveStep::Details)]
#[tokio::test]
async fn failed_later_write_reports_partial_save(
    #[future] floor: Floor,
    #[case] fault: Fault,
    #[case] expected: SaveStep,
) {
    let floor = floor.await;
    let mut session = started(&floor).await;
    let detail_id = session.lines().first().expect("detail line").detail.id;
    log_change(&mut session, LogFormChange::OperatorName("Ivan".to_owned()));
    log_change(&mut session, LogFormChange::StartMeter("10.0".to_owned()));
    log_change(&mut session, LogFormChange::EndMeter("12.5".to_owned()));
    session.apply(ExecutionChange::DetailActual(detail_id, "4".to_owned()));
    session.apply(ExecutionChange::Status(JobStatus::Done));
    let inputs = session.draft().clone();

    let result = faulty_execution(&floor, fault).save(&mut session).await;

    assert!(matches!(
        result,
        Err(ShopServiceError::PartialSave { completed, .. }) if completed == expected
    ));
    assert_eq!(session.draft(), &inputs);
    let program_id = session.program().expect("program").id;
    let logs = floor.store.list_logs(program_id).await.expect("logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(session.log().map(|log| log.id), logs.first().map(|log| log.id));

    let stored_job = floor
        .store
        .find_job(floor.job_id)
        .await
        .expect("find")
        .expect("job");
    assert_eq!(stored_job.status(), JobStatus::InProgress);
    assert_eq!(session.job().status(), JobStatus::InProgress);
    let stored_counts = floor
        .store
        .list_details(floor.job_id)
        .await
        .expect("details")
        .first()
        .expect("line")
        .detail
        .counts;
    let expected_actual = if expected == SaveStep::Details { 4 } else { 0 };
    assert_eq!(stored_counts.quantity_actual, Some(expected_actual));
    assert!(
        floor
            .notifications
            .list_recent(10)
            .await
            .expect("notifications")
            .iter()
            .all(|notification| notification.kind != NotificationKind::JobCompleted)
    );
}

#[rstest]
#[tokio::test]
async fn retry_after_partial_save_completes_the_job(#[future] floor: Floor) {
    let floor = floor.await;
    let mut session = started(&floor).await;
    log_change(&mut session, LogFormChange::OperatorName("Ivan".to_owned()));
    log_change(&mut session, LogFormChange::StartMeter("10".to_owned()));
    log_change(&mut session, LogFormChange::EndMeter("11".to_owned()));
    session.apply(ExecutionChange::Status(JobStatus::Done));
    let failed = faulty_execution(&floor, Fault::JobStatus)
        .save(&mut session)
        .await;
    assert!(matches!(failed, Err(ShopServiceError::PartialSave { .. })));

    let outcome = floor.execution.save(&mut session).await.expect("retry");

    assert_eq!(outcome.status_change, Some(JobStatus::Done));
    assert!(outcome.completion.is_some());
    let logs = floor
        .store
        .list_logs(outcome.log.program_id)
        .await
        .expect("logs");
    assert_eq!(logs.len(), 1);
}

//! Job execution form state and the save guard.
//!
//! [`ExecutionDraft`] is the reducer behind the operator screen. A save is
//! only sent to the store once [`ExecutionDraft::validate_save`] has accepted
//! it; every rejection leaves the draft untouched.

use super::log_form::{LogForm, LogFormChange};
use super::{
    CuttingJob, CuttingLogEntry, CuttingProgram, DetailCounts, JobDetailId, JobDetailLine,
    JobStatus, LogEntryId, LogFields, ProgramId, ShopDomainError,
};
use std::collections::BTreeMap;

/// Raw actual/rejected inputs for one detail row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailDraft {
    /// Actual pieces as typed.
    pub actual: String,
    /// Rejected pieces as typed.
    pub rejected: String,
}

impl DetailDraft {
    /// Pre-fills the inputs from stored counts.
    #[must_use]
    pub fn from_counts(counts: DetailCounts) -> Self {
        Self {
            actual: counts
                .quantity_actual
                .map(|value| value.to_string())
                .unwrap_or_default(),
            rejected: counts
                .rejection_count
                .map(|value| value.to_string())
                .unwrap_or_default(),
        }
    }

    /// Parses the inputs into storable counts.
    #[must_use]
    pub fn counts(&self) -> DetailCounts {
        DetailCounts::parse(&self.actual, &self.rejected)
    }
}

/// A single edit on the execution screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionChange {
    /// Edit of the operator log form.
    Log(LogFormChange),
    /// Target status picked.
    Status(JobStatus),
    /// Actual pieces typed for a detail row.
    DetailActual(JobDetailId, String),
    /// Rejected pieces typed for a detail row.
    DetailRejected(JobDetailId, String),
    /// Program file name typed.
    ProgramName(String),
}

/// Operator screen state for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionDraft {
    /// Operator log inputs.
    pub log: LogForm,
    /// Status the save should move the job to.
    pub status: JobStatus,
    /// Detail inputs keyed by detail row.
    pub details: BTreeMap<JobDetailId, DetailDraft>,
    /// Program file name input.
    pub program_name: String,
}

/// Checked save, ready to be written in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSave {
    /// Program the log belongs to.
    pub program_id: ProgramId,
    /// Existing log row, `None` when the save starts the log.
    pub existing_log: Option<LogEntryId>,
    /// Parsed log values.
    pub fields: LogFields,
    /// Parsed detail counts.
    pub details: Vec<(JobDetailId, DetailCounts)>,
    /// Status change, `None` when the status is unchanged.
    pub status_change: Option<JobStatus>,
}

impl ValidatedSave {
    /// Returns whether the save completes the job.
    #[must_use]
    pub fn completes_job(&self) -> bool {
        self.status_change == Some(JobStatus::Done)
    }
}

impl ExecutionDraft {
    /// Pre-fills the screen from what the store holds for the job.
    #[must_use]
    pub fn load(
        job: &CuttingJob,
        program: Option<&CuttingProgram>,
        log: Option<&CuttingLogEntry>,
        lines: &[JobDetailLine],
    ) -> Self {
        Self {
            log: log.map(LogForm::from_entry).unwrap_or_default(),
            status: job.status(),
            details: lines
                .iter()
                .map(|line| (line.detail.id, DetailDraft::from_counts(line.detail.counts)))
                .collect(),
            program_name: program
                .map(|existing| existing.file_name.as_str().to_owned())
                .unwrap_or_default(),
        }
    }

    /// Applies one change.
    pub fn apply(&mut self, change: ExecutionChange) {
        match change {
            ExecutionChange::Log(log_change) => self.log.apply(log_change),
            ExecutionChange::Status(status) => self.status = status,
            ExecutionChange::DetailActual(id, value) => {
                self.details.entry(id).or_default().actual = value;
            }
            ExecutionChange::DetailRejected(id, value) => {
                self.details.entry(id).or_default().rejected = value;
            }
            ExecutionChange::ProgramName(value) => self.program_name = value,
        }
    }

    /// Consumes the draft and returns it with `change` applied.
    #[must_use]
    pub fn with(mut self, change: ExecutionChange) -> Self {
        self.apply(change);
        self
    }

    /// Checks a save against the job lifecycle and the log requirements.
    ///
    /// Checks run in a fixed order: program presence, lifecycle, log start
    /// fields, then the completion meter rule.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ShopDomainError`]; nothing has been
    /// written when this fails.
    pub fn validate_save(
        &self,
        job: &CuttingJob,
        program: Option<ProgramId>,
        existing_log: Option<LogEntryId>,
    ) -> Result<ValidatedSave, ShopDomainError> {
        let program_id = program.ok_or(ShopDomainError::NoProgram)?;
        job.ensure_can_transition_to(self.status)?;

        let log_starting = existing_log.is_none();
        if log_starting
            && (self.log.operator_name.trim().is_empty() || self.log.start_meter.trim().is_empty())
        {
            return Err(ShopDomainError::MissingOperatorOrStartMeter);
        }

        let status_change = (self.status != job.status()).then_some(self.status);
        if self.status == JobStatus::Done && !self.end_meter_exceeds_start() {
            return Err(ShopDomainError::EndMeterNotAboveStart);
        }

        Ok(ValidatedSave {
            program_id,
            existing_log,
            fields: self.log.to_fields(),
            details: self
                .details
                .iter()
                .map(|(id, draft)| (*id, draft.counts()))
                .collect(),
            status_change,
        })
    }

    fn end_meter_exceeds_start(&self) -> bool {
        match (self.log.start_meter_value(), self.log.end_meter_value()) {
            (Some(start), Some(end)) => end > start,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::domain::{JobId, PersistedJobData};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    fn job_with_status(status: JobStatus) -> CuttingJob {
        CuttingJob::from_persisted(PersistedJobData {
            id: JobId::new(7),
            status,
            due_date: None,
            notes: String::new(),
            creation_date: Utc::now(),
        })
    }

    #[fixture]
    fn in_progress() -> CuttingJob {
        job_with_status(JobStatus::InProgress)
    }

    fn started_draft(job: &CuttingJob) -> ExecutionDraft {
        ExecutionDraft::load(job, None, None, &[])
            .with(ExecutionChange::Log(LogFormChange::OperatorName(
                "Ivan".to_owned(),
            )))
            .with(ExecutionChange::Log(LogFormChange::StartMeter(
                "10.0".to_owned(),
            )))
    }

    #[rstest]
    fn save_without_program_is_rejected_first(in_progress: CuttingJob) {
        let draft = ExecutionDraft::load(&in_progress, None, None, &[])
            .with(ExecutionChange::Status(JobStatus::Queued));
        assert_eq!(
            draft.validate_save(&in_progress, None, None),
            Err(ShopDomainError::NoProgram)
        );
    }

    #[rstest]
    fn starting_log_requires_operator_and_start(in_progress: CuttingJob) {
        let draft = ExecutionDraft::load(&in_progress, None, None, &[]).with(
            ExecutionChange::Log(LogFormChange::OperatorName("Ivan".to_owned())),
        );
        assert_eq!(
            draft.validate_save(&in_progress, Some(ProgramId::new(1)), None),
            Err(ShopDomainError::MissingOperatorOrStartMeter)
        );
    }

    #[rstest]
    fn existing_log_skips_start_requirements(in_progress: CuttingJob) {
        let draft = ExecutionDraft::load(&in_progress, None, None, &[]);
        let save = draft
            .validate_save(
                &in_progress,
                Some(ProgramId::new(1)),
                Some(LogEntryId::new(4)),
            )
            .expect("existing log accepts empty fields");
        assert_eq!(save.status_change, None);
    }

    #[rstest]
    #[case("")]
    #[case("10.0")]
    #[case("9.5")]
    #[case("abc")]
    fn done_requires_end_above_start(in_progress: CuttingJob, #[case] end: &str) {
        let draft = started_draft(&in_progress)
            .with(ExecutionChange::Log(LogFormChange::EndMeter(end.to_owned())))
            .with(ExecutionChange::Status(JobStatus::Done));
        assert_eq!(
            draft.validate_save(&in_progress, Some(ProgramId::new(1)), None),
            Err(ShopDomainError::EndMeterNotAboveStart)
        );
    }

    #[rstest]
    fn done_with_valid_meters_completes(in_progress: CuttingJob) {
        let draft = started_draft(&in_progress)
            .with(ExecutionChange::Log(LogFormChange::EndMeter("15.5".to_owned())))
            .with(ExecutionChange::Status(JobStatus::Done));
        let save = draft
            .validate_save(&in_progress, Some(ProgramId::new(1)), None)
            .expect("valid completion");
        assert!(save.completes_job());
        assert_eq!(save.fields.end_meter, Some(15.5));
    }

    #[test]
    fn terminal_job_cannot_be_reopened() {
        let done = job_with_status(JobStatus::Done);
        let draft = started_draft(&done).with(ExecutionChange::Status(JobStatus::InProgress));
        assert!(matches!(
            draft.validate_save(&done, Some(ProgramId::new(1)), None),
            Err(ShopDomainError::InvalidStatusTransition { .. })
        ));
    }

    #[rstest]
    fn detail_inputs_are_parsed_on_save(in_progress: CuttingJob) {
        let id = JobDetailId::new(3);
        let draft = started_draft(&in_progress)
            .with(ExecutionChange::DetailActual(id, "5".to_owned()))
            .with(ExecutionChange::DetailRejected(id, "x".to_owned()));
        let save = draft
            .validate_save(&in_progress, Some(ProgramId::new(1)), None)
            .expect("valid save");
        assert_eq!(
            save.details,
            vec![(
                id,
                DetailCounts {
                    quantity_actual: Some(5),
                    rejection_count: Some(0)
                }
            )]
        );
    }
}

//! Operator cutting log entries and the create-or-update write policy.

use super::{LogEntryId, ProgramId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Operator-entered log values after permissive parsing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogFields {
    /// Operator running the machine.
    pub operator_name: String,
    /// Day the cut took place.
    pub cut_date: Option<NaiveDate>,
    /// Gas meter reading before cutting.
    pub start_meter: Option<f64>,
    /// Gas meter reading after cutting.
    pub end_meter: Option<f64>,
    /// Oxygen pressure in bar; `None` when air was used or nothing entered.
    pub oxygen_pressure: Option<f64>,
    /// Whether compressed air was used instead of oxygen.
    pub air_used: bool,
    /// Machine preparation time.
    pub preparation_time_minutes: Option<u32>,
    /// Cutting time.
    pub cutting_time_minutes: Option<u32>,
}

/// Insert payload for a first log save.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCuttingLogEntry {
    /// Program the log belongs to.
    pub program_id: ProgramId,
    /// Logged values.
    pub fields: LogFields,
    /// Stamp of the first save.
    pub start_time: DateTime<Utc>,
}

/// Update payload for later saves of the same log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogUpdate {
    /// Row to overwrite.
    pub id: LogEntryId,
    /// Logged values.
    pub fields: LogFields,
    /// Stamp of this save.
    pub end_time: DateTime<Utc>,
}

/// Decision taken by the upsert policy for one save.
#[derive(Debug, Clone, PartialEq)]
pub enum LogWrite {
    /// No log exists for the program yet.
    Insert(NewCuttingLogEntry),
    /// The program's log is rewritten in place.
    Update(LogUpdate),
}

impl LogWrite {
    /// Plans the write for a save: an existing row is updated and stamped
    /// with `end_time`, otherwise a new row is inserted with `start_time`.
    #[must_use]
    pub fn plan(
        program_id: ProgramId,
        existing: Option<LogEntryId>,
        fields: LogFields,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.utc();
        match existing {
            Some(id) => Self::Update(LogUpdate {
                id,
                fields,
                end_time: now,
            }),
            None => Self::Insert(NewCuttingLogEntry {
                program_id,
                fields,
                start_time: now,
            }),
        }
    }
}

/// Stored cutting log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingLogEntry {
    /// Store-assigned key.
    pub id: LogEntryId,
    /// Program the log belongs to.
    pub program_id: ProgramId,
    /// Logged values.
    pub fields: LogFields,
    /// Stamp of the first save.
    pub start_time: Option<DateTime<Utc>>,
    /// Stamp of the latest update.
    pub end_time: Option<DateTime<Utc>>,
}

/// Parses a decimal input; blank or unparsable input yields `None`.
#[must_use]
pub fn parse_decimal(input: &str) -> Option<f64> {
    input
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses a minute count; blank, negative or unparsable input yields `None`.
#[must_use]
pub fn parse_minutes(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok()
}

/// Parses an ISO calendar date, ignoring any time suffix.
#[must_use]
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

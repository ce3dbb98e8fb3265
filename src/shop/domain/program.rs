//! Cutting programs attached to jobs.

use super::{JobId, ProgramId, ShopDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine program file name, e.g. `sheet1.nc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramFileName(String);

impl ProgramFileName {
    /// Creates a trimmed, non-empty file name.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::EmptyProgramFileName`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ShopDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ShopDomainError::EmptyProgramFileName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the file name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProgramFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insert payload for a cutting program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCuttingProgram {
    /// Owning job.
    pub job_id: JobId,
    /// Program file name.
    pub file_name: ProgramFileName,
}

/// Stored cutting program; at most one per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuttingProgram {
    /// Store-assigned key.
    pub id: ProgramId,
    /// Owning job.
    pub job_id: JobId,
    /// Current file name.
    pub file_name: ProgramFileName,
}

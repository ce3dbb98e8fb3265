//! Row identifiers for the shop-floor tables.
//!
//! Identifiers are assigned by the store on insert (serial keys), so the
//! domain never mints them itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a store-assigned key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw key.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                value.trim().parse::<i64>().map(Self)
            }
        }
    };
}

row_id!(
    /// Key of a `cutting_jobs` row.
    JobId
);
row_id!(
    /// Key of an `articles` row.
    ArticleId
);
row_id!(
    /// Key of a `job_details` row.
    JobDetailId
);
row_id!(
    /// Key of a `cutting_programs` row.
    ProgramId
);
row_id!(
    /// Key of a `cutting_log` row.
    LogEntryId
);

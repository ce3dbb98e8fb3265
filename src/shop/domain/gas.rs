//! Gas consumption estimate for the cutting log.

use super::log_entry::parse_decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cutting gas in use, derived from the exclusive oxygen/air inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasSelection {
    /// Neither oxygen pressure nor air has been entered.
    Unspecified,
    /// Oxygen pressure was entered.
    Oxygen,
    /// The air checkbox is set.
    Air,
}

impl GasSelection {
    /// Derives the selection from the two form flags.
    ///
    /// The form keeps the flags exclusive; should both ever be set, oxygen
    /// wins because its pressure value is what gets stored.
    #[must_use]
    pub const fn from_flags(oxygen_entered: bool, air_used: bool) -> Self {
        match (oxygen_entered, air_used) {
            (true, _) => Self::Oxygen,
            (false, true) => Self::Air,
            (false, false) => Self::Unspecified,
        }
    }
}

/// Display-only gas consumption value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GasConsumption {
    /// A meter reading or the gas choice is missing.
    NoData,
    /// The readings are unusable: unparsable, or the end is below the start.
    CounterError,
    /// Meter difference rounded to two decimals.
    Measured {
        /// Consumed amount.
        amount: f64,
        /// Gas the amount is attributed to.
        gas: GasSelection,
    },
}

impl GasConsumption {
    /// Computes the estimate from raw meter inputs.
    ///
    /// Blank readings give [`Self::NoData`]; a reversed or unparsable counter
    /// gives [`Self::CounterError`] whatever gas is selected.
    #[must_use]
    pub fn compute(start_input: &str, end_input: &str, selection: GasSelection) -> Self {
        if start_input.trim().is_empty() || end_input.trim().is_empty() {
            return Self::NoData;
        }
        let (Some(start), Some(end)) = (parse_decimal(start_input), parse_decimal(end_input))
        else {
            return Self::CounterError;
        };
        if end < start {
            return Self::CounterError;
        }
        if selection == GasSelection::Unspecified {
            return Self::NoData;
        }
        Self::Measured {
            amount: rounded_difference(start, end),
            gas: selection,
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "meter readings are decimal quantities"
)]
fn rounded_difference(start: f64, end: f64) -> f64 {
    ((end - start) * 100.0).round() / 100.0
}

impl fmt::Display for GasConsumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("--"),
            Self::CounterError => f.write_str("counter error"),
            Self::Measured { amount, gas } => {
                let tag = match gas {
                    GasSelection::Oxygen => " (O₂)",
                    GasSelection::Air => " (Air)",
                    GasSelection::Unspecified => "",
                };
                write!(f, "{amount:.2}{tag}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL_SELECTIONS: [GasSelection; 3] = [
        GasSelection::Unspecified,
        GasSelection::Oxygen,
        GasSelection::Air,
    ];

    #[rstest]
    #[case("10", "9.99")]
    #[case("100", "0")]
    #[case("-1", "-2")]
    #[case("0.01", "0")]
    fn reversed_counter_is_an_error_for_every_gas(#[case] start: &str, #[case] end: &str) {
        for selection in ALL_SELECTIONS {
            assert_eq!(
                GasConsumption::compute(start, end, selection),
                GasConsumption::CounterError,
                "selection {selection:?}"
            );
        }
    }

    #[rstest]
    #[case("", "15")]
    #[case("10", " ")]
    fn missing_reading_has_no_data(#[case] start: &str, #[case] end: &str) {
        assert_eq!(
            GasConsumption::compute(start, end, GasSelection::Oxygen),
            GasConsumption::NoData
        );
    }

    #[test]
    fn missing_gas_has_no_data() {
        assert_eq!(
            GasConsumption::compute("10", "15", GasSelection::Unspecified),
            GasConsumption::NoData
        );
    }

    #[test]
    fn unparsable_counter_is_an_error() {
        assert_eq!(
            GasConsumption::compute("ten", "15", GasSelection::Air),
            GasConsumption::CounterError
        );
    }

    #[rstest]
    #[case(GasSelection::Oxygen, "5.50 (O₂)")]
    #[case(GasSelection::Air, "5.50 (Air)")]
    fn measured_amount_is_rounded_and_tagged(
        #[case] selection: GasSelection,
        #[case] expected: &str,
    ) {
        let consumption = GasConsumption::compute("10.0", "15.5", selection);
        assert_eq!(consumption.to_string(), expected);
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        let consumption = GasConsumption::compute("1.001", "2.3366", GasSelection::Air);
        assert_eq!(
            consumption,
            GasConsumption::Measured {
                amount: 1.34,
                gas: GasSelection::Air
            }
        );
    }

    #[test]
    fn sentinels_render_for_display() {
        assert_eq!(GasConsumption::NoData.to_string(), "--");
        assert_eq!(GasConsumption::CounterError.to_string(), "counter error");
    }
}

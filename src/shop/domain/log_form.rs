//! Operator log form state and its change reducer.
//!
//! The form holds raw text exactly as typed; parsing happens only when the
//! values are turned into [`LogFields`] for a save.

use super::gas::{GasConsumption, GasSelection};
use super::log_entry::{CuttingLogEntry, LogFields, parse_date, parse_decimal, parse_minutes};
use serde::{Deserialize, Serialize};

/// Raw operator log inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogForm {
    /// Operator name.
    pub operator_name: String,
    /// Cut date as `YYYY-MM-DD`.
    pub cut_date: String,
    /// Start meter reading.
    pub start_meter: String,
    /// End meter reading.
    pub end_meter: String,
    /// Oxygen pressure; cleared whenever air is selected.
    pub oxygen_pressure: String,
    /// Air checkbox; cleared whenever an oxygen pressure is entered.
    pub air_used: bool,
    /// Preparation minutes.
    pub preparation_time: String,
    /// Cutting minutes.
    pub cutting_time: String,
}

/// A single edit of the log form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormChange {
    /// Operator name typed.
    OperatorName(String),
    /// Cut date picked.
    CutDate(String),
    /// Start meter typed.
    StartMeter(String),
    /// End meter typed.
    EndMeter(String),
    /// Oxygen pressure typed.
    OxygenPressure(String),
    /// Air checkbox toggled.
    AirUsed(bool),
    /// Preparation minutes typed.
    PreparationTime(String),
    /// Cutting minutes typed.
    CuttingTime(String),
}

impl LogForm {
    /// Pre-fills the form from a stored log entry.
    #[must_use]
    pub fn from_entry(entry: &CuttingLogEntry) -> Self {
        let fields = &entry.fields;
        Self {
            operator_name: fields.operator_name.clone(),
            cut_date: fields
                .cut_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            start_meter: display_optional(fields.start_meter),
            end_meter: display_optional(fields.end_meter),
            oxygen_pressure: if fields.air_used {
                String::new()
            } else {
                display_optional(fields.oxygen_pressure)
            },
            air_used: fields.air_used,
            preparation_time: display_optional(fields.preparation_time_minutes),
            cutting_time: display_optional(fields.cutting_time_minutes),
        }
    }

    /// Applies one change, keeping oxygen pressure and air exclusive.
    pub fn apply(&mut self, change: LogFormChange) {
        match change {
            LogFormChange::OperatorName(value) => self.operator_name = value,
            LogFormChange::CutDate(value) => self.cut_date = value,
            LogFormChange::StartMeter(value) => self.start_meter = value,
            LogFormChange::EndMeter(value) => self.end_meter = value,
            LogFormChange::OxygenPressure(value) => {
                if !value.trim().is_empty() {
                    self.air_used = false;
                }
                self.oxygen_pressure = value;
            }
            LogFormChange::AirUsed(checked) => {
                if checked {
                    self.oxygen_pressure.clear();
                }
                self.air_used = checked;
            }
            LogFormChange::PreparationTime(value) => self.preparation_time = value,
            LogFormChange::CuttingTime(value) => self.cutting_time = value,
        }
    }

    /// Consumes the form and returns it with `change` applied.
    #[must_use]
    pub fn with(mut self, change: LogFormChange) -> Self {
        self.apply(change);
        self
    }

    /// Returns the gas currently selected.
    #[must_use]
    pub fn gas_selection(&self) -> GasSelection {
        GasSelection::from_flags(!self.oxygen_pressure.trim().is_empty(), self.air_used)
    }

    /// Recomputes the gas-consumption estimate.
    #[must_use]
    pub fn gas_consumption(&self) -> GasConsumption {
        GasConsumption::compute(&self.start_meter, &self.end_meter, self.gas_selection())
    }

    /// Preparation plus cutting minutes; unparsable inputs count as zero.
    #[must_use]
    pub fn total_minutes(&self) -> u32 {
        let preparation = parse_minutes(&self.preparation_time).unwrap_or(0);
        let cutting = parse_minutes(&self.cutting_time).unwrap_or(0);
        preparation.saturating_add(cutting)
    }

    /// Returns the parsed start meter reading.
    #[must_use]
    pub fn start_meter_value(&self) -> Option<f64> {
        parse_decimal(&self.start_meter)
    }

    /// Returns the parsed end meter reading.
    #[must_use]
    pub fn end_meter_value(&self) -> Option<f64> {
        parse_decimal(&self.end_meter)
    }

    /// Parses the form into storable values.
    #[must_use]
    pub fn to_fields(&self) -> LogFields {
        LogFields {
            operator_name: self.operator_name.trim().to_owned(),
            cut_date: parse_date(&self.cut_date),
            start_meter: self.start_meter_value(),
            end_meter: self.end_meter_value(),
            oxygen_pressure: if self.air_used {
                None
            } else {
                parse_decimal(&self.oxygen_pressure)
            },
            air_used: self.air_used,
            preparation_time_minutes: parse_minutes(&self.preparation_time),
            cutting_time_minutes: parse_minutes(&self.cutting_time),
        }
    }
}

fn display_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|inner| inner.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn oxygen_form() -> LogForm {
        LogForm::default().with(LogFormChange::OxygenPressure("12".to_owned()))
    }

    fn both_active(form: &LogForm) -> bool {
        form.air_used && !form.oxygen_pressure.trim().is_empty()
    }

    #[rstest]
    fn checking_air_clears_oxygen(oxygen_form: LogForm) {
        let form = oxygen_form.with(LogFormChange::AirUsed(true));
        assert!(form.air_used);
        assert_eq!(form.oxygen_pressure, "");
        assert_eq!(form.gas_selection(), GasSelection::Air);
    }

    #[test]
    fn typing_oxygen_clears_air() {
        let form = LogForm::default()
            .with(LogFormChange::AirUsed(true))
            .with(LogFormChange::OxygenPressure("8.5".to_owned()));
        assert!(!form.air_used);
        assert_eq!(form.gas_selection(), GasSelection::Oxygen);
    }

    #[test]
    fn clearing_oxygen_keeps_air_unchanged() {
        let form = LogForm::default()
            .with(LogFormChange::AirUsed(true))
            .with(LogFormChange::OxygenPressure("  ".to_owned()));
        assert!(form.air_used);
    }

    #[test]
    fn gas_flags_never_both_active_after_any_change() {
        let changes = [
            LogFormChange::OxygenPressure("10".to_owned()),
            LogFormChange::AirUsed(true),
            LogFormChange::OxygenPressure("3".to_owned()),
            LogFormChange::StartMeter("1".to_owned()),
            LogFormChange::AirUsed(false),
            LogFormChange::AirUsed(true),
            LogFormChange::OxygenPressure(String::new()),
            LogFormChange::OxygenPressure("4".to_owned()),
        ];
        let mut form = LogForm::default();
        for change in changes {
            form.apply(change.clone());
            assert!(!both_active(&form), "both gases active after {change:?}");
        }
    }

    #[rstest]
    #[case("15", "30", 45)]
    #[case("abc", "30", 30)]
    #[case("", "", 0)]
    fn total_minutes_treats_garbage_as_zero(
        #[case] preparation: &str,
        #[case] cutting: &str,
        #[case] expected: u32,
    ) {
        let form = LogForm::default()
            .with(LogFormChange::PreparationTime(preparation.to_owned()))
            .with(LogFormChange::CuttingTime(cutting.to_owned()));
        assert_eq!(form.total_minutes(), expected);
    }

    #[rstest]
    fn to_fields_parses_permissively(oxygen_form: LogForm) {
        let fields = oxygen_form
            .with(LogFormChange::OperatorName(" Ivan ".to_owned()))
            .with(LogFormChange::StartMeter("10,5".to_owned()))
            .with(LogFormChange::EndMeter("n/a".to_owned()))
            .to_fields();
        assert_eq!(fields.operator_name, "Ivan");
        assert_eq!(fields.start_meter, Some(10.5));
        assert_eq!(fields.end_meter, None);
        assert_eq!(fields.oxygen_pressure, Some(12.0));
        assert!(!fields.air_used);
    }
}

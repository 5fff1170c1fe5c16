//! Schedule anchoring for boletos registered without an explicit start date.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::add_months;

/// Where installment #1 falls when no explicit start date is supplied.
///
/// Anchored schedules count every due date from the creation date, so
/// installment `k` is due `lead_months() + k - 1` months after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleAnchor {
    /// First installment due on the creation date itself.
    CreationDate,
    /// First installment due one calendar month after creation.
    #[default]
    NextMonth,
}

impl ScheduleAnchor {
    pub fn lead_months(self) -> u32 {
        match self {
            ScheduleAnchor::CreationDate => 0,
            ScheduleAnchor::NextMonth => 1,
        }
    }

    /// First due date for a boleto created on `created`.
    pub fn resolve(self, created: NaiveDate) -> NaiveDate {
        self.due_date(created, 1)
    }

    /// Due date of installment `number` (1-based), taken from the creation
    /// date each time so month-end clamping never accumulates.
    pub fn due_date(self, created: NaiveDate, number: u32) -> NaiveDate {
        add_months(created, self.lead_months() + number.saturating_sub(1))
    }
}

impl fmt::Display for ScheduleAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleAnchor::CreationDate => f.write_str("creation-date"),
            ScheduleAnchor::NextMonth => f.write_str("next-month"),
        }
    }
}

impl FromStr for ScheduleAnchor {
    type Err = UnknownAnchor;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "creation-date" | "creation" | "today" => Ok(ScheduleAnchor::CreationDate),
            "next-month" | "next" => Ok(ScheduleAnchor::NextMonth),
            _ => Err(UnknownAnchor(value.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAnchor(pub String);

impl fmt::Display for UnknownAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown schedule anchor `{}` (expected next-month or creation-date)",
            self.0
        )
    }
}

impl std::error::Error for UnknownAnchor {}

//! Report filter selections shared by the aggregator and front ends.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
/// Creation-date windows used to narrow reports.
pub enum ReportPeriod {
    LastMonth,
    Last3Months,
    Last6Months,
    LastYear,
    #[default]
    All,
}

impl ReportPeriod {
    /// Length of the window in calendar months; `None` means unbounded.
    pub fn months(self) -> Option<u32> {
        match self {
            ReportPeriod::LastMonth => Some(1),
            ReportPeriod::Last3Months => Some(3),
            ReportPeriod::Last6Months => Some(6),
            ReportPeriod::LastYear => Some(12),
            ReportPeriod::All => None,
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportPeriod::LastMonth => "Last month",
            ReportPeriod::Last3Months => "Last 3 months",
            ReportPeriod::Last6Months => "Last 6 months",
            ReportPeriod::LastYear => "Last year",
            ReportPeriod::All => "All periods",
        };
        f.write_str(label)
    }
}

impl FromStr for ReportPeriod {
    type Err = UnknownFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "lastmonth" | "1m" => Ok(ReportPeriod::LastMonth),
            "last3months" | "3m" => Ok(ReportPeriod::Last3Months),
            "last6months" | "6m" => Ok(ReportPeriod::Last6Months),
            "lastyear" | "12m" | "1y" => Ok(ReportPeriod::LastYear),
            "all" => Ok(ReportPeriod::All),
            _ => Err(UnknownFilter::period(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
/// Installment-state predicates used to narrow boleto listings.
pub enum StatusFilter {
    #[default]
    All,
    /// Every installment paid.
    Paid,
    /// At least one unpaid installment that is not yet due.
    Pending,
    /// At least one unpaid installment past its due date.
    Overdue,
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusFilter::All => "All",
            StatusFilter::Paid => "Paid",
            StatusFilter::Pending => "Pending",
            StatusFilter::Overdue => "Overdue",
        };
        f.write_str(label)
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "paid" => Ok(StatusFilter::Paid),
            "pending" => Ok(StatusFilter::Pending),
            "overdue" => Ok(StatusFilter::Overdue),
            _ => Err(UnknownFilter::status(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when a filter label does not name a known option.
pub struct UnknownFilter {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownFilter {
    fn period(value: &str) -> Self {
        Self {
            kind: "period",
            value: value.trim().to_string(),
        }
    }

    fn status(value: &str) -> Self {
        Self {
            kind: "status",
            value: value.trim().to_string(),
        }
    }
}

impl fmt::Display for UnknownFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} filter `{}`", self.kind, self.value)
    }
}

impl std::error::Error for UnknownFilter {}

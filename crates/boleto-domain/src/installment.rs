//! Installments and their payment state classification.

use std::fmt;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::Amounted;

/// Number of days ahead of `today` within which an unpaid installment is due soon.
pub const DEFAULT_DUE_SOON_DAYS: u32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// One scheduled payment within a boleto.
pub struct Installment {
    pub number: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub paid: bool,
}

impl Installment {
    pub fn new(number: u32, amount: Decimal, due_date: NaiveDate) -> Self {
        Self {
            number,
            amount,
            due_date,
            paid: false,
        }
    }

    /// Classifies the installment against `today` using the default due-soon window.
    pub fn status(&self, today: NaiveDate) -> PaymentStatus {
        classify(self, today)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.paid && self.due_date < today
    }

    pub fn toggle_paid(&mut self) {
        self.paid = !self.paid;
    }
}

impl Amounted for Installment {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Payment state of an installment relative to a reference day.
pub enum PaymentStatus {
    Paid,
    Overdue,
    DueSoon,
    Upcoming,
}

impl PaymentStatus {
    /// True for states that still expect money to come in.
    pub fn is_open(self) -> bool {
        !matches!(self, PaymentStatus::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Overdue => "Overdue",
            PaymentStatus::DueSoon => "Due soon",
            PaymentStatus::Upcoming => "Upcoming",
        };
        f.write_str(label)
    }
}

/// Classifies `installment` on `today` with the default seven day window.
pub fn classify(installment: &Installment, today: NaiveDate) -> PaymentStatus {
    classify_with_window(installment, today, DEFAULT_DUE_SOON_DAYS)
}

/// Classifies `installment` on `today`; rules are checked in order: paid,
/// due before today, due before `today + due_soon_days`, otherwise upcoming.
/// A window reaching past the calendar range makes every open installment due soon.
pub fn classify_with_window(
    installment: &Installment,
    today: NaiveDate,
    due_soon_days: u32,
) -> PaymentStatus {
    if installment.paid {
        PaymentStatus::Paid
    } else if installment.due_date < today {
        PaymentStatus::Overdue
    } else if today
        .checked_add_signed(Duration::days(i64::from(due_soon_days)))
        .map_or(true, |window_end| installment.due_date < window_end)
    {
        PaymentStatus::DueSoon
    } else {
        PaymentStatus::Upcoming
    }
}

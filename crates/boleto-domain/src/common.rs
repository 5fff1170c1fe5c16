//! Shared traits, calendar helpers, and enums for receivable primitives.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in the portfolio.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> Decimal;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
/// Enumerates the ways a down payment or an installment can be settled.
#[derive(Default)]
pub enum PaymentMethod {
    Pix,
    #[default]
    Cash,
    Card,
    Boleto,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Pix,
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Boleto,
    ];

    /// Returns the lowercase tag used in serialized records.
    pub fn tag(self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Boleto => "boleto",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Boleto => "Boleto",
        };
        f.pad(label)
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pix" => Ok(PaymentMethod::Pix),
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "card" | "cartao" | "cartão" => Ok(PaymentMethod::Card),
            "boleto" => Ok(PaymentMethod::Boleto),
            _ => Err(UnknownPaymentMethod(value.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when a payment method tag does not match any known method.
pub struct UnknownPaymentMethod(pub String);

impl fmt::Display for UnknownPaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown payment method `{}`", self.0)
    }
}

impl std::error::Error for UnknownPaymentMethod {}

/// Adds `months` calendar months to `date`, clamping the day to the end of the
/// target month (Jan 31 + 1 month is the last day of February).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    shift_month(date, months as i32)
}

/// Moves `date` by a signed number of calendar months with end-of-month clamping.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first_next) => (first_next - Duration::days(1)).day(),
        None => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months(date(2024, 1, 31), 2), date(2024, 3, 31));
    }

    #[test]
    fn shift_month_crosses_year_boundaries() {
        assert_eq!(shift_month(date(2024, 11, 15), 3), date(2025, 2, 15));
        assert_eq!(shift_month(date(2024, 1, 15), -1), date(2023, 12, 15));
        assert_eq!(shift_month(date(2024, 3, 31), -13), date(2023, 2, 28));
    }

    #[test]
    fn payment_method_parses_tags_and_aliases() {
        assert_eq!("PIX".parse::<PaymentMethod>(), Ok(PaymentMethod::Pix));
        assert_eq!(" dinheiro ".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert_eq!("cartão".parse::<PaymentMethod>(), Ok(PaymentMethod::Card));
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn payment_method_serializes_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Boleto).unwrap();
        assert_eq!(json, "\"boleto\"");
    }
}

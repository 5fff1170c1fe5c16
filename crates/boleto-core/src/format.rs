//! Money and date presentation helpers.
//!
//! Amounts are stored at full precision; rounding to cents happens here, at
//! the formatting boundary, and nowhere else.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Formats currency amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: Decimal, currency: &str) -> String;
}

/// Formats dates for presentation.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}

/// Rounds a monetary amount to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn symbol_for(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "BRL" => "R$".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        other => other.into(),
    }
}

/// Separator and pattern preferences for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFormatter {
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub date_pattern: String,
}

impl LocaleFormatter {
    pub fn pt_br() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: '.',
            date_pattern: "%d/%m/%Y".into(),
        }
    }

    pub fn en_us() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
            date_pattern: "%Y-%m-%d".into(),
        }
    }

    /// Picks separators for a language tag such as `pt-BR` or `en_US`.
    pub fn for_locale(tag: &str) -> Self {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        if normalized.starts_with("pt") || normalized.starts_with("es") || normalized.starts_with("de")
        {
            Self::pt_br()
        } else {
            Self::en_us()
        }
    }

    /// Renders `value` with two decimals and digit grouping.
    pub fn format_number(&self, value: Decimal) -> String {
        let rounded = round_money(value.abs());
        let text = rounded.to_string();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((int_part, frac_part)) => (int_part.to_string(), frac_part.to_string()),
            None => (text, String::new()),
        };
        let mut cents = frac_part;
        while cents.len() < 2 {
            cents.push('0');
        }
        let sign = if round_money(value).is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{}{}{}{}",
            sign,
            group_digits(&int_part, self.grouping_separator),
            self.decimal_separator,
            cents
        )
    }
}

impl Default for LocaleFormatter {
    fn default() -> Self {
        Self::pt_br()
    }
}

impl CurrencyFormatter for LocaleFormatter {
    fn format_amount(&self, amount: Decimal, currency: &str) -> String {
        let body = self.format_number(amount);
        let symbol = symbol_for(currency);
        match body.strip_prefix('-') {
            Some(positive) => format!("-{} {}", symbol, positive),
            None => format!("{} {}", symbol, body),
        }
    }
}

impl DateFormatter for LocaleFormatter {
    fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_pattern).to_string()
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

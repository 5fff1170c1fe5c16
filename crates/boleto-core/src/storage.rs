use std::{collections::HashSet, path::PathBuf};

use boleto_domain::Boleto;

use crate::{CoreError, MAX_TOTAL_VALUE};

/// Describes a persisted backup artifact for the portfolio.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing the portfolio and its backups.
///
/// Loads and saves are whole-collection operations.
pub trait PortfolioStorage: Send + Sync {
    fn load(&self) -> Result<Vec<Boleto>, CoreError>;
    fn save(&self, portfolio: &[Boleto]) -> Result<(), CoreError>;
    fn backup(&self, portfolio: &[Boleto], note: Option<&str>) -> Result<BackupInfo, CoreError>;
    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError>;
    fn restore(&self, backup: &BackupInfo) -> Result<Vec<Boleto>, CoreError>;
}

/// Structural problems that make a boleto's schedule unusable, including
/// amounts outside `0..=MAX_TOTAL_VALUE` that portfolio sums could not hold.
pub fn schedule_violations(boleto: &Boleto) -> Vec<String> {
    let mut violations = Vec::new();
    let amounts = [boleto.total_value, boleto.down_payment]
        .into_iter()
        .chain(boleto.installments.iter().map(|p| p.amount));
    if amounts
        .into_iter()
        .any(|amount| amount.is_sign_negative() || amount > MAX_TOTAL_VALUE)
    {
        violations.push(format!(
            "boleto {} has an amount outside 0..={}",
            boleto.id, MAX_TOTAL_VALUE
        ));
    }
    if boleto.installments.len() != boleto.installment_count as usize {
        violations.push(format!(
            "boleto {} declares {} installments but has {}",
            boleto.id,
            boleto.installment_count,
            boleto.installments.len()
        ));
    }
    for (position, installment) in boleto.installments.iter().enumerate() {
        let expected = position as u32 + 1;
        if installment.number != expected {
            violations.push(format!(
                "boleto {} installment at position {} is numbered {} (expected {})",
                boleto.id, position, installment.number, expected
            ));
        }
    }
    violations
}

/// Detects anomalies across a portfolio snapshot without rejecting it.
pub fn portfolio_warnings(portfolio: &[Boleto]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    for boleto in portfolio {
        if !seen.insert(boleto.id) {
            warnings.push(format!("duplicate boleto id {}", boleto.id));
        }
        if boleto.down_payment >= boleto.total_value {
            warnings.push(format!(
                "boleto {} has a down payment not below its total",
                boleto.id
            ));
        }
        warnings.extend(schedule_violations(boleto));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScheduleAnchor, ScheduleService};
    use boleto_domain::{BoletoHeader, PaymentMethod};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn boleto() -> Boleto {
        let header = BoletoHeader {
            client_name: "Eva".into(),
            total_value: dec!(500),
            down_payment: dec!(100),
            down_payment_method: PaymentMethod::Cash,
            installment_count: 4,
            installment_method: PaymentMethod::Pix,
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ScheduleService::create(&header, now, ScheduleAnchor::NextMonth).unwrap()
    }

    #[test]
    fn generated_schedule_has_no_violations() {
        assert!(schedule_violations(&boleto()).is_empty());
        assert!(portfolio_warnings(&[boleto(), boleto()]).is_empty());
    }

    #[test]
    fn detects_length_and_numbering_problems() {
        let mut broken = boleto();
        broken.installments.pop();
        broken.installments[1].number = 7;
        let violations = schedule_violations(&broken);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("declares 4 installments but has 3"));
    }

    #[test]
    fn rejects_amounts_beyond_the_accepted_range() {
        let mut huge = boleto();
        huge.total_value = rust_decimal::Decimal::MAX;
        let violations = schedule_violations(&huge);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("amount outside"));

        let mut negative = boleto();
        negative.installments[2].amount = dec!(-1);
        assert_eq!(schedule_violations(&negative).len(), 1);
    }

    #[test]
    fn flags_duplicate_ids() {
        let one = boleto();
        let warnings = portfolio_warnings(&[one.clone(), one]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("duplicate boleto id"));
    }
}

//! The boleto record: header fields plus its owned installment schedule.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{Amounted, Identifiable, PaymentMethod},
    installment::Installment,
    schedule::ScheduleAnchor,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// A registered receivable split into a down payment and equal installments.
pub struct Boleto {
    pub id: Uuid,
    pub client_name: String,
    pub total_value: Decimal,
    pub down_payment: Decimal,
    #[serde(default)]
    pub down_payment_method: PaymentMethod,
    pub installment_method: PaymentMethod,
    pub installment_count: u32,
    pub installment_amount: Decimal,
    pub created_at: DateTime<Utc>,
    /// Due date of installment #1. Records written before the start date
    /// became part of the schema load as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Set when the schedule was derived from `created_at` instead of an
    /// explicit start date; regenerating keeps counting from creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<ScheduleAnchor>,
    pub installments: Vec<Installment>,
}

impl Boleto {
    /// Returns the header fields the boleto was created (or last edited) with.
    /// Creation-anchored boletos report no start date so a rebuild re-derives it.
    pub fn header(&self) -> BoletoHeader {
        BoletoHeader {
            client_name: self.client_name.clone(),
            total_value: self.total_value,
            down_payment: self.down_payment,
            down_payment_method: self.down_payment_method,
            installment_count: self.installment_count,
            installment_method: self.installment_method,
            start_date: match self.anchor {
                Some(_) => None,
                None => self.anchor_date(),
            },
        }
    }

    /// The schedule anchor: the stored start date, falling back to the first due date.
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        self.start_date
            .or_else(|| self.installments.first().map(|p| p.due_date))
    }

    pub fn installment(&self, index: usize) -> Option<&Installment> {
        self.installments.get(index)
    }

    /// True iff every installment has been marked paid.
    pub fn is_fully_paid(&self) -> bool {
        self.installments.iter().all(|installment| installment.paid)
    }

    /// Sum of the amounts of installments marked paid.
    pub fn paid_installments_value(&self) -> Decimal {
        self.installments
            .iter()
            .filter(|installment| installment.paid)
            .map(Amounted::amount)
            .sum()
    }

    /// Down payment (received at creation) plus every paid installment.
    pub fn total_paid_value(&self) -> Decimal {
        self.down_payment + self.paid_installments_value()
    }

    pub fn outstanding_value(&self) -> Decimal {
        self.total_value - self.total_paid_value()
    }

    /// Amount financed through installments.
    pub fn financed_value(&self) -> Decimal {
        self.total_value - self.down_payment
    }

    pub fn unpaid_count(&self) -> usize {
        self.installments.iter().filter(|p| !p.paid).count()
    }

    pub fn has_overdue(&self, today: NaiveDate) -> bool {
        self.installments.iter().any(|p| p.is_overdue(today))
    }

    /// True when at least one unpaid installment is not yet past due.
    pub fn has_pending(&self, today: NaiveDate) -> bool {
        self.installments
            .iter()
            .any(|p| !p.paid && p.due_date >= today)
    }

    pub fn uses_method(&self, method: PaymentMethod) -> bool {
        self.installment_method == method || self.down_payment_method == method
    }
}

impl Identifiable for Boleto {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Boleto {
    fn amount(&self) -> Decimal {
        self.total_value
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// User-supplied header fields from which a schedule is generated.
pub struct BoletoHeader {
    pub client_name: String,
    pub total_value: Decimal,
    pub down_payment: Decimal,
    pub down_payment_method: PaymentMethod,
    pub installment_count: u32,
    pub installment_method: PaymentMethod,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Boleto {
        let installments = (0..3)
            .map(|i| Installment::new(i + 1, dec!(300), date(2024, 1 + i, 5)))
            .collect();
        Boleto {
            id: Uuid::new_v4(),
            client_name: "Maria".into(),
            total_value: dec!(1000),
            down_payment: dec!(100),
            down_payment_method: PaymentMethod::Pix,
            installment_method: PaymentMethod::Boleto,
            installment_count: 3,
            installment_amount: dec!(300),
            created_at: Utc::now(),
            start_date: Some(date(2024, 1, 5)),
            anchor: None,
            installments,
        }
    }

    #[test]
    fn paid_value_counts_down_payment_and_paid_installments() {
        let mut boleto = sample();
        assert_eq!(boleto.total_paid_value(), dec!(100));
        boleto.installments[1].paid = true;
        assert_eq!(boleto.total_paid_value(), dec!(400));
        assert_eq!(boleto.outstanding_value(), dec!(600));
        assert!(!boleto.is_fully_paid());
    }

    #[test]
    fn fully_paid_requires_every_installment() {
        let mut boleto = sample();
        for installment in boleto.installments.iter_mut() {
            installment.paid = true;
        }
        assert!(boleto.is_fully_paid());
        assert_eq!(boleto.outstanding_value(), dec!(0));
    }

    #[test]
    fn pending_and_overdue_are_independent() {
        let boleto = sample();
        let today = date(2024, 2, 10);
        assert!(boleto.has_overdue(today));
        assert!(boleto.has_pending(today));
        assert!(!boleto.has_overdue(date(2024, 1, 5)));
    }

    #[test]
    fn anchor_falls_back_to_first_due_date() {
        let mut boleto = sample();
        boleto.start_date = None;
        assert_eq!(boleto.anchor_date(), Some(date(2024, 1, 5)));
        assert_eq!(boleto.header().start_date, Some(date(2024, 1, 5)));
    }

    #[test]
    fn creation_anchored_header_has_no_start_date() {
        let mut boleto = sample();
        boleto.anchor = Some(ScheduleAnchor::NextMonth);
        assert_eq!(boleto.header().start_date, None);
        assert_eq!(boleto.anchor_date(), Some(date(2024, 1, 5)));
        let json = serde_json::to_value(&boleto).unwrap();
        assert_eq!(json["anchor"], "next-month");
    }

    #[test]
    fn serializes_with_camel_case_keys_and_iso_dates() {
        let boleto = sample();
        let json = serde_json::to_value(&boleto).unwrap();
        assert_eq!(json["clientName"], "Maria");
        assert_eq!(json["installmentMethod"], "boleto");
        assert_eq!(json["installments"][0]["dueDate"], "2024-01-05");
        let back: Boleto = serde_json::from_value(json).unwrap();
        assert_eq!(back, boleto);
    }

    #[test]
    fn missing_optional_fields_are_defaulted() {
        let mut json = serde_json::to_value(sample()).unwrap();
        let object = json.as_object_mut().unwrap();
        object.remove("startDate");
        object.remove("downPaymentMethod");
        let loaded: Boleto = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.start_date, None);
        assert_eq!(loaded.anchor, None);
        assert_eq!(loaded.down_payment_method, PaymentMethod::Cash);
    }
}

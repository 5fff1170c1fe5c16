//! Turns validated header input into a dated installment schedule.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

pub use boleto_domain::ScheduleAnchor;
use boleto_domain::{add_months, Boleto, BoletoHeader, Installment};

use crate::{BoletoField, ValidationError};

/// Largest accepted total value. Keeps portfolio-wide sums far from the
/// `Decimal` range.
pub const MAX_TOTAL_VALUE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Builds installment schedules and validates the inputs they come from.
pub struct ScheduleService;

impl ScheduleService {
    /// Produces the ordered schedule for the given amounts.
    ///
    /// Installment `k` is due `k - 1` months after `start_date`, each date
    /// computed from the anchor so month-end clamping never drifts.
    pub fn generate_schedule(
        total_value: Decimal,
        down_payment: Decimal,
        installment_count: u32,
        start_date: NaiveDate,
    ) -> Result<Vec<Installment>, ValidationError> {
        Self::validate_amounts(total_value, down_payment, installment_count)?;
        let amount = Self::installment_amount(total_value, down_payment, installment_count);
        Ok((0..installment_count)
            .map(|offset| Installment::new(offset + 1, amount, add_months(start_date, offset)))
            .collect())
    }

    /// Schedule for a boleto without an explicit start date: every due date
    /// is counted from `created` through the anchor.
    pub fn generate_anchored_schedule(
        total_value: Decimal,
        down_payment: Decimal,
        installment_count: u32,
        created: NaiveDate,
        anchor: ScheduleAnchor,
    ) -> Result<Vec<Installment>, ValidationError> {
        Self::validate_amounts(total_value, down_payment, installment_count)?;
        let amount = Self::installment_amount(total_value, down_payment, installment_count);
        Ok((1..=installment_count)
            .map(|number| Installment::new(number, amount, anchor.due_date(created, number)))
            .collect())
    }

    /// `(total - down) / count`, kept at full precision.
    pub fn installment_amount(
        total_value: Decimal,
        down_payment: Decimal,
        installment_count: u32,
    ) -> Decimal {
        if installment_count == 0 {
            return Decimal::ZERO;
        }
        (total_value - down_payment) / Decimal::from(installment_count)
    }

    /// Checks every header field, reporting the first invalid one.
    pub fn validate(header: &BoletoHeader) -> Result<(), ValidationError> {
        if header.client_name.trim().is_empty() {
            return Err(ValidationError::Required(BoletoField::ClientName));
        }
        Self::validate_amounts(
            header.total_value,
            header.down_payment,
            header.installment_count,
        )
    }

    fn validate_amounts(
        total_value: Decimal,
        down_payment: Decimal,
        installment_count: u32,
    ) -> Result<(), ValidationError> {
        if total_value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveTotal);
        }
        if total_value > MAX_TOTAL_VALUE {
            return Err(ValidationError::TotalTooLarge(MAX_TOTAL_VALUE));
        }
        if down_payment < Decimal::ZERO {
            return Err(ValidationError::NegativeDownPayment);
        }
        if down_payment >= total_value {
            return Err(ValidationError::DownPaymentNotBelowTotal);
        }
        if installment_count == 0 {
            return Err(ValidationError::NonPositiveInstallmentCount);
        }
        Ok(())
    }

    /// Registers a new boleto created at `now`.
    pub fn create(
        header: &BoletoHeader,
        now: DateTime<Utc>,
        anchor: ScheduleAnchor,
    ) -> Result<Boleto, ValidationError> {
        Self::build(Uuid::new_v4(), header, now, anchor)
    }

    /// Builds a boleto with a fresh schedule for an existing identity.
    /// `anchor` only applies when the header has no start date.
    pub(crate) fn build(
        id: Uuid,
        header: &BoletoHeader,
        created_at: DateTime<Utc>,
        anchor: ScheduleAnchor,
    ) -> Result<Boleto, ValidationError> {
        Self::validate(header)?;
        let (installments, anchor) = match header.start_date {
            Some(start_date) => (
                Self::generate_schedule(
                    header.total_value,
                    header.down_payment,
                    header.installment_count,
                    start_date,
                )?,
                None,
            ),
            None => (
                Self::generate_anchored_schedule(
                    header.total_value,
                    header.down_payment,
                    header.installment_count,
                    created_at.date_naive(),
                    anchor,
                )?,
                Some(anchor),
            ),
        };
        let start_date = installments.first().map(|p| p.due_date);
        debug!(
            %id,
            count = header.installment_count,
            start_date = ?start_date,
            anchor = ?anchor,
            "generated installment schedule"
        );
        Ok(Boleto {
            id,
            client_name: header.client_name.trim().to_string(),
            total_value: header.total_value,
            down_payment: header.down_payment,
            down_payment_method: header.down_payment_method,
            installment_method: header.installment_method,
            installment_count: header.installment_count,
            installment_amount: Self::installment_amount(
                header.total_value,
                header.down_payment,
                header.installment_count,
            ),
            created_at,
            start_date,
            anchor,
            installments,
        })
    }
}

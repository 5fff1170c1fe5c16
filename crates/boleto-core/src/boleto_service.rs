//! Copy-on-write mutations of a single boleto.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use boleto_domain::{Boleto, BoletoHeader};

use crate::{
    schedule_service::{ScheduleAnchor, ScheduleService},
    CoreError, CoreResult,
};

/// Provides validated state transitions for [`Boleto`] values.
///
/// Every operation takes the current value by reference and returns the next
/// one; the caller commits it into the owning collection.
pub struct BoletoService;

impl BoletoService {
    /// Toggles the `paid` flag of the installment at `index` (0-based).
    pub fn mark_paid(boleto: &Boleto, index: usize) -> CoreResult<Boleto> {
        let mut next = boleto.clone();
        let installment = next
            .installments
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange {
                index,
                len: boleto.installments.len(),
            })?;
        installment.toggle_paid();
        debug!(id = %boleto.id, index, paid = installment.paid, "toggled installment");
        Ok(next)
    }

    /// Moves one installment to `new_due_date`; other installments keep their dates.
    pub fn reschedule_installment(
        boleto: &Boleto,
        index: usize,
        new_due_date: NaiveDate,
    ) -> CoreResult<Boleto> {
        let mut next = boleto.clone();
        let installment = next
            .installments
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange {
                index,
                len: boleto.installments.len(),
            })?;
        debug!(
            id = %boleto.id,
            index,
            from = %installment.due_date,
            to = %new_due_date,
            "rescheduled installment"
        );
        installment.due_date = new_due_date;
        Ok(next)
    }

    /// Applies new header fields.
    ///
    /// A change to anything beyond the client name regenerates the schedule
    /// from scratch: paid flags and manually edited due dates are discarded.
    /// `id` and `created_at` always carry over. A boleto anchored to its
    /// creation date keeps its own anchor; `anchor` applies only to boletos
    /// gaining an anchor through this edit. On error `boleto` is untouched.
    pub fn edit(
        boleto: &Boleto,
        header: &BoletoHeader,
        anchor: ScheduleAnchor,
    ) -> CoreResult<Boleto> {
        ScheduleService::validate(header)?;
        if Self::only_name_changed(boleto, header) {
            let mut next = boleto.clone();
            next.client_name = header.client_name.trim().to_string();
            debug!(id = %boleto.id, "renamed boleto client");
            return Ok(next);
        }
        let anchor = boleto.anchor.unwrap_or(anchor);
        let next = ScheduleService::build(boleto.id, header, boleto.created_at, anchor)?;
        debug!(
            id = %boleto.id,
            previous_count = boleto.installment_count,
            count = next.installment_count,
            "regenerated schedule after edit"
        );
        Ok(next)
    }

    pub fn is_fully_paid(boleto: &Boleto) -> bool {
        boleto.is_fully_paid()
    }

    pub fn total_paid_value(boleto: &Boleto) -> Decimal {
        boleto.total_paid_value()
    }

    fn only_name_changed(boleto: &Boleto, header: &BoletoHeader) -> bool {
        let current = boleto.header();
        current.total_value == header.total_value
            && current.down_payment == header.down_payment
            && current.down_payment_method == header.down_payment_method
            && current.installment_count == header.installment_count
            && current.installment_method == header.installment_method
            && (header.start_date.is_none() || current.start_date == header.start_date)
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use boleto_domain::{classify_with_window, Boleto, PaymentStatus};

/// An unpaid installment that needs attention: past due or due soon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAlert {
    pub boleto_id: Uuid,
    pub client_name: String,
    pub index: usize,
    pub number: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
}

impl PaymentAlert {
    pub fn is_overdue(&self) -> bool {
        self.status == PaymentStatus::Overdue
    }
}

pub struct AlertService;

impl AlertService {
    /// Collects overdue and due-soon installments in collection then schedule order.
    pub fn alerts(portfolio: &[Boleto], today: NaiveDate, due_soon_days: u32) -> Vec<PaymentAlert> {
        portfolio
            .iter()
            .flat_map(|boleto| {
                boleto
                    .installments
                    .iter()
                    .enumerate()
                    .filter_map(move |(index, installment)| {
                        match classify_with_window(installment, today, due_soon_days) {
                            status @ (PaymentStatus::Overdue | PaymentStatus::DueSoon) => {
                                Some(PaymentAlert {
                                    boleto_id: boleto.id,
                                    client_name: boleto.client_name.clone(),
                                    index,
                                    number: installment.number,
                                    amount: installment.amount,
                                    due_date: installment.due_date,
                                    status,
                                })
                            }
                            PaymentStatus::Paid | PaymentStatus::Upcoming => None,
                        }
                    })
            })
            .collect()
    }
}

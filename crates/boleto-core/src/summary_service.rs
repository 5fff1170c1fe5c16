//! Read-only reductions over the portfolio used by dashboards and reports.
//!
//! Every function takes the reference date explicitly; nothing here reads
//! the system clock.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use boleto_domain::{
    Boleto, Installment, PaymentMethod, PaymentStatus, ReportPeriod, StatusFilter,
};

/// An unpaid installment denormalized for display next to other boletos' installments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingInstallment {
    pub boleto_id: Uuid,
    pub client_name: String,
    pub method: PaymentMethod,
    /// 0-based position within the boleto's schedule.
    pub index: usize,
    pub number: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Every headline figure of the dashboard, computed in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_count: usize,
    pub total_value: Decimal,
    pub total_installments: u64,
    pub total_received: Decimal,
    pub total_outstanding: Decimal,
    pub overdue_count: usize,
    pub overdue_value: Decimal,
    pub fully_paid_count: usize,
    pub percent_fully_paid: Decimal,
    pub percent_received: Decimal,
    pub by_payment_method: BTreeMap<PaymentMethod, Decimal>,
    pub upcoming: Vec<UpcomingInstallment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusDistribution {
    pub paid: usize,
    pub overdue: usize,
    /// Due soon or upcoming.
    pub to_come: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Breakdown figures for the report screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub total_count: usize,
    pub total_value: Decimal,
    pub total_received: Decimal,
    pub total_outstanding: Decimal,
    pub average_per_boleto: Decimal,
    pub total_down_payments: Decimal,
    pub total_financed: Decimal,
    pub pending_installments: usize,
    pub status_distribution: StatusDistribution,
    pub count_by_installment_method: BTreeMap<PaymentMethod, usize>,
    pub count_by_down_payment_method: BTreeMap<PaymentMethod, usize>,
    pub value_by_creation_month: BTreeMap<YearMonth, Decimal>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn total_count(portfolio: &[Boleto]) -> usize {
        portfolio.len()
    }

    pub fn total_value(portfolio: &[Boleto]) -> Decimal {
        portfolio.iter().map(|b| b.total_value).sum()
    }

    pub fn total_installments(portfolio: &[Boleto]) -> u64 {
        portfolio.iter().map(|b| u64::from(b.installment_count)).sum()
    }

    /// Down payments plus every paid installment.
    pub fn total_received(portfolio: &[Boleto]) -> Decimal {
        portfolio.iter().map(Boleto::total_paid_value).sum()
    }

    pub fn total_outstanding(portfolio: &[Boleto]) -> Decimal {
        Self::total_value(portfolio) - Self::total_received(portfolio)
    }

    /// Number of installments past due and unpaid on `today`.
    pub fn overdue_count(portfolio: &[Boleto], today: NaiveDate) -> usize {
        Self::overdue_installments(portfolio, today).count()
    }

    pub fn overdue_value(portfolio: &[Boleto], today: NaiveDate) -> Decimal {
        Self::overdue_installments(portfolio, today)
            .map(|p| p.amount)
            .sum()
    }

    pub fn fully_paid_count(portfolio: &[Boleto]) -> usize {
        portfolio.iter().filter(|b| b.is_fully_paid()).count()
    }

    /// Amount received per method. A boleto may feed two buckets: its down
    /// payment under `down_payment_method` and its paid installments under
    /// `installment_method`.
    pub fn by_payment_method(portfolio: &[Boleto]) -> BTreeMap<PaymentMethod, Decimal> {
        let mut buckets = BTreeMap::new();
        for boleto in portfolio {
            if !boleto.down_payment.is_zero() {
                *buckets
                    .entry(boleto.down_payment_method)
                    .or_insert(Decimal::ZERO) += boleto.down_payment;
            }
            let paid = boleto.paid_installments_value();
            if !paid.is_zero() {
                *buckets
                    .entry(boleto.installment_method)
                    .or_insert(Decimal::ZERO) += paid;
            }
        }
        buckets
    }

    /// The `limit` nearest unpaid installments by due date, overdue ones first.
    ///
    /// Ties keep collection order, then schedule order.
    pub fn upcoming_due(portfolio: &[Boleto], limit: usize) -> Vec<UpcomingInstallment> {
        let mut upcoming: Vec<UpcomingInstallment> = portfolio
            .iter()
            .flat_map(|boleto| {
                boleto
                    .installments
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| !p.paid)
                    .map(move |(index, p)| UpcomingInstallment {
                        boleto_id: boleto.id,
                        client_name: boleto.client_name.clone(),
                        method: boleto.installment_method,
                        index,
                        number: p.number,
                        amount: p.amount,
                        due_date: p.due_date,
                    })
            })
            .collect();
        upcoming.sort_by_key(|item| item.due_date);
        upcoming.truncate(limit);
        upcoming
    }

    /// Keeps boletos created within `period` of `now`; `All` keeps everything.
    pub fn filter_by_period(
        portfolio: &[Boleto],
        now: DateTime<Utc>,
        period: ReportPeriod,
    ) -> Vec<Boleto> {
        let cutoff = period
            .months()
            .and_then(|months| now.checked_sub_months(Months::new(months)));
        match cutoff {
            Some(cutoff) => portfolio
                .iter()
                .filter(|b| b.created_at >= cutoff)
                .cloned()
                .collect(),
            None => portfolio.to_vec(),
        }
    }

    /// Non-exclusive status predicates: a boleto with both a late and a future
    /// open installment matches `Pending` and `Overdue`.
    pub fn filter_by_status(
        portfolio: &[Boleto],
        today: NaiveDate,
        status: StatusFilter,
    ) -> Vec<Boleto> {
        portfolio
            .iter()
            .filter(|b| match status {
                StatusFilter::All => true,
                StatusFilter::Paid => b.is_fully_paid(),
                StatusFilter::Pending => b.has_pending(today),
                StatusFilter::Overdue => b.has_overdue(today),
            })
            .cloned()
            .collect()
    }

    pub fn filter_by_method(portfolio: &[Boleto], method: PaymentMethod) -> Vec<Boleto> {
        portfolio
            .iter()
            .filter(|b| b.uses_method(method))
            .cloned()
            .collect()
    }

    pub fn dashboard(
        portfolio: &[Boleto],
        today: NaiveDate,
        upcoming_limit: usize,
    ) -> DashboardSummary {
        let total_count = Self::total_count(portfolio);
        let total_value = Self::total_value(portfolio);
        let total_received = Self::total_received(portfolio);
        let fully_paid_count = Self::fully_paid_count(portfolio);
        DashboardSummary {
            total_count,
            total_value,
            total_installments: Self::total_installments(portfolio),
            total_received,
            total_outstanding: total_value - total_received,
            overdue_count: Self::overdue_count(portfolio, today),
            overdue_value: Self::overdue_value(portfolio, today),
            fully_paid_count,
            percent_fully_paid: percent(
                Decimal::from(fully_paid_count as u64),
                Decimal::from(total_count as u64),
            ),
            percent_received: percent(total_received, total_value),
            by_payment_method: Self::by_payment_method(portfolio),
            upcoming: Self::upcoming_due(portfolio, upcoming_limit),
        }
    }

    pub fn report(portfolio: &[Boleto], today: NaiveDate) -> ReportSummary {
        let total_count = Self::total_count(portfolio);
        let total_value = Self::total_value(portfolio);
        let total_received = Self::total_received(portfolio);
        let total_down_payments: Decimal = portfolio.iter().map(|b| b.down_payment).sum();

        let mut count_by_installment_method = BTreeMap::new();
        let mut count_by_down_payment_method = BTreeMap::new();
        let mut value_by_creation_month = BTreeMap::new();
        for boleto in portfolio {
            *count_by_installment_method
                .entry(boleto.installment_method)
                .or_insert(0) += 1;
            *count_by_down_payment_method
                .entry(boleto.down_payment_method)
                .or_insert(0) += 1;
            *value_by_creation_month
                .entry(YearMonth::of(boleto.created_at.date_naive()))
                .or_insert(Decimal::ZERO) += boleto.total_value;
        }

        ReportSummary {
            total_count,
            total_value,
            total_received,
            total_outstanding: total_value - total_received,
            average_per_boleto: if total_count == 0 {
                Decimal::ZERO
            } else {
                total_value / Decimal::from(total_count as u64)
            },
            total_down_payments,
            total_financed: total_value - total_down_payments,
            pending_installments: portfolio.iter().map(Boleto::unpaid_count).sum(),
            status_distribution: Self::status_distribution(portfolio, today),
            count_by_installment_method,
            count_by_down_payment_method,
            value_by_creation_month,
        }
    }

    pub fn status_distribution(portfolio: &[Boleto], today: NaiveDate) -> StatusDistribution {
        let mut distribution = StatusDistribution::default();
        for installment in portfolio.iter().flat_map(|b| b.installments.iter()) {
            match installment.status(today) {
                PaymentStatus::Paid => distribution.paid += 1,
                PaymentStatus::Overdue => distribution.overdue += 1,
                PaymentStatus::DueSoon | PaymentStatus::Upcoming => distribution.to_come += 1,
            }
        }
        distribution
    }

    fn overdue_installments(
        portfolio: &[Boleto],
        today: NaiveDate,
    ) -> impl Iterator<Item = &Installment> {
        portfolio
            .iter()
            .flat_map(|b| b.installments.iter())
            .filter(move |p| p.is_overdue(today))
    }
}

/// `part / whole * 100`, or zero when `whole` is zero.
fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part * Decimal::ONE_HUNDRED / whole
    }
}

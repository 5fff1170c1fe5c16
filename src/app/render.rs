//! Text rendering for command output. Nothing here prints; callers decide where lines go.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use boleto_core::{
    CurrencyFormatter, DashboardSummary, DateFormatter, LocaleFormatter, PaymentAlert,
    ReportSummary, UpcomingInstallment,
};
use boleto_domain::{classify_with_window, Boleto, Installment, PaymentStatus};

use crate::output::status_label;

/// Short id shown in listings; any unique prefix is accepted back as input.
pub fn short_id(boleto: &Boleto) -> String {
    boleto.id.to_string()[..8].to_string()
}

/// Formatting context shared by every rendered line.
pub struct Presenter {
    pub formatter: LocaleFormatter,
    pub currency: String,
    pub today: NaiveDate,
    pub due_soon_days: u32,
}

impl Presenter {
    pub fn money(&self, amount: Decimal) -> String {
        self.formatter.format_amount(amount, &self.currency)
    }

    pub fn date(&self, date: NaiveDate) -> String {
        self.formatter.format_date(date)
    }

    pub fn boleto_row(&self, boleto: &Boleto) -> String {
        let paid = boleto.installments.iter().filter(|p| p.paid).count();
        let state = if boleto.is_fully_paid() {
            status_label(PaymentStatus::Paid).to_string()
        } else if boleto.has_overdue(self.today) {
            status_label(PaymentStatus::Overdue).to_string()
        } else {
            "Open".to_string()
        };
        format!(
            "{}  {:<24} {:>16}  {}/{} paid  {}",
            short_id(boleto),
            boleto.client_name,
            self.money(boleto.total_value),
            paid,
            boleto.installments.len(),
            state
        )
    }

    pub fn boleto_detail(&self, boleto: &Boleto) -> Vec<String> {
        let mut lines = vec![
            format!("Id:           {}", boleto.id),
            format!("Client:       {}", boleto.client_name),
            format!("Total:        {}", self.money(boleto.total_value)),
            format!(
                "Down payment: {} ({})",
                self.money(boleto.down_payment),
                boleto.down_payment_method
            ),
            format!(
                "Installments: {} x {} ({})",
                boleto.installment_count,
                self.money(boleto.installment_amount),
                boleto.installment_method
            ),
            format!(
                "Created:      {}",
                self.date(boleto.created_at.date_naive())
            ),
            format!(
                "Received:     {} of {}",
                self.money(boleto.total_paid_value()),
                self.money(boleto.total_value)
            ),
        ];
        for installment in &boleto.installments {
            let status = classify_with_window(installment, self.today, self.due_soon_days);
            lines.push(format!(
                "  #{:<3} {}  {:>14}  {}",
                installment.number,
                self.date(installment.due_date),
                self.money(installment.amount),
                status_label(status)
            ));
        }
        lines
    }

    pub fn dashboard(&self, summary: &DashboardSummary) -> Vec<String> {
        let mut lines = vec![
            format!("Boletos:        {}", summary.total_count),
            format!("Total value:    {}", self.money(summary.total_value)),
            format!("Installments:   {}", summary.total_installments),
            format!(
                "Received:       {} ({}%)",
                self.money(summary.total_received),
                summary.percent_received.round_dp(1)
            ),
            format!("Outstanding:    {}", self.money(summary.total_outstanding)),
            format!(
                "Overdue:        {} installments, {}",
                summary.overdue_count,
                self.money(summary.overdue_value)
            ),
            format!(
                "Fully paid:     {} ({}%)",
                summary.fully_paid_count,
                summary.percent_fully_paid.round_dp(1)
            ),
        ];
        if !summary.by_payment_method.is_empty() {
            lines.push("Received by method:".to_string());
            for (method, amount) in &summary.by_payment_method {
                lines.push(format!("  {:<8} {}", method, self.money(*amount)));
            }
        }
        if !summary.upcoming.is_empty() {
            lines.push("Next installments:".to_string());
            lines.extend(summary.upcoming.iter().map(|item| self.upcoming(item)));
        }
        lines
    }

    pub fn report(&self, report: &ReportSummary) -> Vec<String> {
        let distribution = report.status_distribution;
        let mut lines = vec![
            format!("Boletos:            {}", report.total_count),
            format!("Total value:        {}", self.money(report.total_value)),
            format!("Average per boleto: {}", self.money(report.average_per_boleto)),
            format!("Down payments:      {}", self.money(report.total_down_payments)),
            format!("Financed:           {}", self.money(report.total_financed)),
            format!("Received:           {}", self.money(report.total_received)),
            format!("Outstanding:        {}", self.money(report.total_outstanding)),
            format!("Pending installments: {}", report.pending_installments),
            format!(
                "Installment status: {} paid, {} overdue, {} to come",
                distribution.paid, distribution.overdue, distribution.to_come
            ),
        ];
        lines.push("Boletos by installment method:".to_string());
        for (method, count) in &report.count_by_installment_method {
            lines.push(format!("  {:<8} {}", method, count));
        }
        lines.push("Boletos by down payment method:".to_string());
        for (method, count) in &report.count_by_down_payment_method {
            lines.push(format!("  {:<8} {}", method, count));
        }
        lines.push("Value by creation month:".to_string());
        for (month, value) in &report.value_by_creation_month {
            lines.push(format!("  {}  {}", month, self.money(*value)));
        }
        lines
    }

    pub fn upcoming(&self, item: &UpcomingInstallment) -> String {
        let pending = Installment::new(item.number, item.amount, item.due_date);
        let status = classify_with_window(&pending, self.today, self.due_soon_days);
        format!(
            "  {}  {:<24} #{:<3} {:>14}  {:<8} {}",
            self.date(item.due_date),
            item.client_name,
            item.number,
            self.money(item.amount),
            item.method,
            status_label(status)
        )
    }

    pub fn alert(&self, alert: &PaymentAlert) -> String {
        format!(
            "  {:<9} {}  {:<24} #{:<3} {:>14}",
            status_label(alert.status).to_string(),
            self.date(alert.due_date),
            alert.client_name,
            alert.number,
            self.money(alert.amount)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boleto_core::{BoletoService, ScheduleAnchor, ScheduleService, SummaryService};
    use boleto_domain::{BoletoHeader, PaymentMethod};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn presenter() -> Presenter {
        colored::control::set_override(false);
        Presenter {
            formatter: LocaleFormatter::pt_br(),
            currency: "BRL".into(),
            today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            due_soon_days: 7,
        }
    }

    fn boleto() -> Boleto {
        let header = BoletoHeader {
            client_name: "Ana".into(),
            total_value: dec!(1200),
            down_payment: dec!(200),
            down_payment_method: PaymentMethod::Pix,
            installment_count: 5,
            installment_method: PaymentMethod::Boleto,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10),
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let created = ScheduleService::create(&header, now, ScheduleAnchor::NextMonth).unwrap();
        BoletoService::mark_paid(&created, 0).unwrap()
    }

    #[test]
    fn detail_lists_each_installment_with_status() {
        let lines = presenter().boleto_detail(&boleto());
        let installments: Vec<_> = lines.iter().filter(|l| l.starts_with("  #")).collect();
        assert_eq!(installments.len(), 5);
        assert!(installments[0].contains("10/01/2024"));
        assert!(installments[0].ends_with("Paid"));
        assert!(installments[1].ends_with("Overdue"));
        assert!(lines.iter().any(|l| l.contains("R$ 400,00 of R$ 1.200,00")));
    }

    #[test]
    fn row_flags_overdue_boletos() {
        let row = presenter().boleto_row(&boleto());
        assert!(row.contains("Ana"));
        assert!(row.contains("1/5 paid"));
        assert!(row.ends_with("Overdue"));
    }

    #[test]
    fn dashboard_lists_methods_and_upcoming() {
        let presenter = presenter();
        let summary = SummaryService::dashboard(&[boleto()], presenter.today, 2);
        let lines = presenter.dashboard(&summary);
        assert!(lines.iter().any(|l| l.contains("Pix") && l.contains("R$ 200,00")));
        let next: Vec<_> = lines
            .iter()
            .skip_while(|l| !l.starts_with("Next installments"))
            .skip(1)
            .collect();
        assert_eq!(next.len(), 2);
        assert!(next[0].contains("10/02/2024") && next[0].ends_with("Overdue"));
        assert!(next[1].contains("10/03/2024"));
    }
}

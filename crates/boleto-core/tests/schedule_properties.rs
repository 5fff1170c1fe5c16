use boleto_core::{BoletoService, ScheduleAnchor, ScheduleService, SummaryService};
use boleto_domain::{add_months, Boleto, BoletoHeader, PaymentMethod, PaymentStatus};
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Inputs spanning month ends, leap days and awkward divisions.
fn cases() -> Vec<(Decimal, Decimal, u32, NaiveDate)> {
    vec![
        (dec!(1200), dec!(200), 5, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
        (dec!(1000), dec!(0), 3, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
        (dec!(99.99), dec!(0.01), 7, NaiveDate::from_ymd_opt(2023, 8, 31).unwrap()),
        (dec!(5000), dec!(4999.99), 12, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
        (dec!(1), dec!(0), 48, NaiveDate::from_ymd_opt(2025, 12, 30).unwrap()),
    ]
}

fn seed(total: Decimal, down: Decimal, count: u32, start: NaiveDate) -> Boleto {
    let header = BoletoHeader {
        client_name: "Property".into(),
        total_value: total,
        down_payment: down,
        down_payment_method: PaymentMethod::Cash,
        installment_count: count,
        installment_method: PaymentMethod::Card,
        start_date: Some(start),
    };
    let now = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    ScheduleService::create(&header, now, ScheduleAnchor::NextMonth).expect("valid header")
}

#[test]
fn installments_sum_to_financed_amount() {
    let tolerance = dec!(0.000001);
    for (total, down, count, start) in cases() {
        let schedule =
            ScheduleService::generate_schedule(total, down, count, start).expect("valid input");
        let sum: Decimal = schedule.iter().map(|p| p.amount).sum();
        assert!(
            (sum - (total - down)).abs() < tolerance,
            "{total} - {down} over {count} summed to {sum}"
        );
    }
}

#[test]
fn schedule_is_numbered_and_monthly() {
    for (total, down, count, start) in cases() {
        let schedule =
            ScheduleService::generate_schedule(total, down, count, start).expect("valid input");
        assert_eq!(schedule.len(), count as usize);
        for (position, installment) in schedule.iter().enumerate() {
            assert_eq!(installment.number, position as u32 + 1);
            assert!(!installment.paid);
            assert_eq!(installment.due_date, add_months(start, position as u32));
        }
        for pair in schedule.windows(2) {
            let months = (pair[1].due_date.year() - pair[0].due_date.year()) * 12
                + pair[1].due_date.month() as i32
                - pair[0].due_date.month() as i32;
            assert_eq!(months, 1);
        }
    }
}

#[test]
fn double_toggle_is_identity() {
    for (total, down, count, start) in cases() {
        let boleto = seed(total, down, count, start);
        for index in 0..boleto.installments.len() {
            let once = BoletoService::mark_paid(&boleto, index).expect("in range");
            let twice = BoletoService::mark_paid(&once, index).expect("in range");
            assert_eq!(twice, boleto);
        }
    }
}

#[test]
fn received_plus_outstanding_equals_total() {
    let mut portfolio = Vec::new();
    for (total, down, count, start) in cases() {
        let mut boleto = seed(total, down, count, start);
        for index in (0..boleto.installments.len()).step_by(2) {
            boleto = BoletoService::mark_paid(&boleto, index).expect("in range");
        }
        portfolio.push(boleto);
        assert_eq!(
            SummaryService::total_received(&portfolio) + SummaryService::total_outstanding(&portfolio),
            SummaryService::total_value(&portfolio)
        );
    }
}

#[test]
fn fully_paid_boleto_never_classifies_open() {
    let boleto = seed(dec!(300), dec!(0), 3, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    let mut paid = boleto.clone();
    for index in 0..paid.installments.len() {
        paid = BoletoService::mark_paid(&paid, index).expect("in range");
    }
    assert!(paid.is_fully_paid());
    for offset in [-400_i64, -1, 0, 1, 30, 400] {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap() + chrono::Duration::days(offset);
        assert!(paid
            .installments
            .iter()
            .all(|p| p.status(today) == PaymentStatus::Paid));
    }
}

#[test]
fn classification_scenarios_on_march_fifteenth() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let boleto = seed(dec!(300), dec!(0), 3, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    let mut moved = BoletoService::reschedule_installment(
        &boleto,
        1,
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
    )
    .expect("in range");
    moved = BoletoService::reschedule_installment(
        &moved,
        2,
        NaiveDate::from_ymd_opt(2024, 3, 25).unwrap(),
    )
    .expect("in range");
    let statuses: Vec<_> = moved.installments.iter().map(|p| p.status(today)).collect();
    assert_eq!(
        statuses,
        vec![
            PaymentStatus::Overdue,
            PaymentStatus::DueSoon,
            PaymentStatus::Upcoming
        ]
    );
}

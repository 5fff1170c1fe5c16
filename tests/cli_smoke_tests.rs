mod common;

use common::{Sandbox, BIN_NAME};
use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

#[test]
fn cli_help_lists_commands() {
    Command::cargo_bin(BIN_NAME)
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("dashboard").and(contains("reschedule")));
}

#[test]
fn empty_portfolio_lists_nothing() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No boletos found."));
}

#[test]
fn add_prints_generated_schedule() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox
        .cmd()
        .args([
            "add", "--client", "Ana", "--total", "1200", "--down", "200", "--count", "5",
            "--start", "2024-01-10",
        ])
        .assert()
        .success()
        .stdout(
            contains("Registered boleto")
                .and(contains("10/05/2024"))
                .and(contains("R$ 200,00"))
                .and(contains("Overdue")),
        );
    assert_eq!(sandbox.ids().len(), 1);
}

#[test]
fn down_payment_equal_to_total_is_rejected() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox
        .cmd()
        .args(["add", "--client", "Ana", "--total", "1000", "--down", "1000", "--count", "3"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("down payment must be less than total"));
}

#[test]
fn paying_updates_dashboard_and_alerts() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox.add("Ana", "1200", "200", "5", "2024-01-10");
    let id = sandbox.ids().remove(0);

    sandbox
        .cmd()
        .args(["pay", &id[..8], "1"])
        .assert()
        .success()
        .stdout(contains("marked paid"));

    sandbox
        .cmd()
        .arg("dashboard")
        .assert()
        .success()
        .stdout(contains("R$ 400,00").and(contains("2 installments")));

    sandbox
        .cmd()
        .arg("alerts")
        .assert()
        .success()
        .stdout(contains("2 overdue"));
}

#[test]
fn pay_rejects_unknown_installment() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox.add("Ana", "300", "0", "3", "2024-01-10");
    let id = sandbox.ids().remove(0);
    sandbox
        .cmd()
        .args(["pay", &id, "9"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("out of range"));
}

#[test]
fn unknown_id_prefix_is_invalid_input() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox.add("Ana", "300", "0", "3", "2024-01-10");
    sandbox
        .cmd()
        .args(["show", "zzzz"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("no boleto matches `zzzz`"));
}

#[test]
fn edit_rebuilds_schedule() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox.add("Bruno", "1200", "200", "5", "2024-01-10");
    let id = sandbox.ids().remove(0);
    sandbox.cmd().args(["pay", &id, "1"]).assert().success();

    sandbox
        .cmd()
        .args(["edit", &id, "--count", "3"])
        .assert()
        .success()
        .stdout(contains("Schedule regenerated"));

    sandbox
        .cmd()
        .args(["show", &id])
        .assert()
        .success()
        .stdout(contains("#3").and(contains("#4").not()).and(contains("Paid").not()));
}

#[test]
fn export_and_import_round_trip() {
    let source = Sandbox::new("2024-03-15");
    source.add("Ana", "1200", "200", "5", "2024-01-10");
    source.add("Bia", "300", "0", "3", "2024-04-01");
    let file = source.path().join("backup.json");
    source
        .cmd()
        .args(["export", "--output"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("Exported 2 boletos"));

    let target = Sandbox::new("2024-03-15");
    target
        .cmd()
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("Imported 2 boletos"));
    assert_eq!(target.ids(), source.ids());
}

#[test]
fn import_rejects_non_array_payload() {
    let sandbox = Sandbox::new("2024-03-15");
    let file = sandbox.path().join("bad.json");
    std::fs::write(&file, r#"{"boletos": []}"#).expect("write file");
    sandbox
        .cmd()
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("Invalid backup format"));
}

#[test]
fn upcoming_respects_limit() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox.add("Ana", "1200", "200", "5", "2024-01-10");
    sandbox
        .cmd()
        .args(["upcoming", "--limit", "1"])
        .assert()
        .success()
        .stdout(
            contains("10/01/2024")
                .and(contains("Overdue"))
                .and(contains("10/02/2024").not()),
        );
}

#[test]
fn config_set_changes_due_soon_window() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox.add("Ana", "300", "0", "3", "2024-03-25");
    sandbox
        .cmd()
        .arg("alerts")
        .assert()
        .success()
        .stdout(contains("No overdue or due-soon installments."));

    sandbox
        .cmd()
        .args(["config", "set", "due_soon_days", "14"])
        .assert()
        .success();
    sandbox
        .cmd()
        .arg("alerts")
        .assert()
        .success()
        .stdout(contains("1 due within 14 days"));
}

#[test]
fn report_filters_by_status() {
    let sandbox = Sandbox::new("2024-03-15");
    sandbox.add("Ana", "1200", "200", "5", "2024-01-10");
    sandbox.add("Bia", "300", "0", "3", "2024-06-01");
    sandbox
        .cmd()
        .args(["report", "--status", "overdue"])
        .assert()
        .success()
        .stdout(contains("Boletos:            1").and(contains("Financed:           R$ 1.000,00")));
}

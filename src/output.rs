use colored::{ColoredString, Colorize};
use std::fmt;

use boleto_domain::PaymentStatus;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

/// Turns ANSI colors on or off for the rest of the process.
pub fn set_color_enabled(enabled: bool) {
    if !enabled {
        colored::control::set_override(false);
    }
}

/// Renders one message line without printing it.
pub fn format_message(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Info => text,
        MessageKind::Success => format!("[ok] {text}").bright_green().to_string(),
        MessageKind::Warning => format!("[!] {text}").bright_yellow().to_string(),
        MessageKind::Error => format!("[x] {text}").bright_red().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = format_message(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        MessageKind::Error => eprintln!("{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

pub fn line(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

/// Status label colored by urgency.
pub fn status_label(status: PaymentStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        PaymentStatus::Paid => label.green(),
        PaymentStatus::Overdue => label.red().bold(),
        PaymentStatus::DueSoon => label.yellow(),
        PaymentStatus::Upcoming => label.normal(),
    }
}

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Installment index {index} out of range (boleto has {len} installments)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Boleto not found: {0}")]
    BoletoNotFound(Uuid),
    #[error("no boleto matches `{0}`")]
    UnknownIdPrefix(String),
    #[error("id prefix `{0}` matches more than one boleto")]
    AmbiguousIdPrefix(String),
    #[error("Invalid backup format: {0}")]
    Format(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True for errors caused by what the caller asked for rather than by
    /// storage or serialization.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::IndexOutOfRange { .. }
                | CoreError::BoletoNotFound(_)
                | CoreError::UnknownIdPrefix(_)
                | CoreError::AmbiguousIdPrefix(_)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Rejected boleto input. Every variant names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(BoletoField),
    #[error("{field} is invalid: {reason}")]
    Invalid { field: BoletoField, reason: String },
    #[error("total value must be greater than zero")]
    NonPositiveTotal,
    #[error("total value must not exceed {0}")]
    TotalTooLarge(rust_decimal::Decimal),
    #[error("down payment must not be negative")]
    NegativeDownPayment,
    #[error("down payment must be less than total")]
    DownPaymentNotBelowTotal,
    #[error("installment count must be greater than zero")]
    NonPositiveInstallmentCount,
}

impl ValidationError {
    pub fn field(&self) -> BoletoField {
        match self {
            ValidationError::Required(field) => *field,
            ValidationError::Invalid { field, .. } => *field,
            ValidationError::NonPositiveTotal | ValidationError::TotalTooLarge(_) => {
                BoletoField::TotalValue
            }
            ValidationError::NegativeDownPayment | ValidationError::DownPaymentNotBelowTotal => {
                BoletoField::DownPayment
            }
            ValidationError::NonPositiveInstallmentCount => BoletoField::InstallmentCount,
        }
    }
}

/// Header fields collected when registering or editing a boleto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoletoField {
    ClientName,
    TotalValue,
    DownPayment,
    DownPaymentMethod,
    InstallmentCount,
    InstallmentMethod,
    StartDate,
}

impl fmt::Display for BoletoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BoletoField::ClientName => "client name",
            BoletoField::TotalValue => "total value",
            BoletoField::DownPayment => "down payment",
            BoletoField::DownPaymentMethod => "down payment method",
            BoletoField::InstallmentCount => "installment count",
            BoletoField::InstallmentMethod => "installment method",
            BoletoField::StartDate => "start date",
        };
        f.write_str(label)
    }
}

//! boleto-core
//!
//! Schedule generation, payment tracking and portfolio reporting for boletos.
//! Depends on boleto-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod alert_service;
pub mod boleto_service;
pub mod error;
pub mod format;
pub mod portfolio_service;
pub mod schedule_service;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use alert_service::*;
pub use boleto_service::*;
pub use error::{BoletoField, CoreError, CoreResult, ValidationError};
pub use format::*;
pub use portfolio_service::*;
pub use schedule_service::*;
pub use storage::*;
pub use summary_service::*;
pub use time::*;

//! boleto-domain
//!
//! Pure domain models (Boleto, Installment, payment methods, report filters).
//! No I/O, no CLI, no storage. Only data types, core enums and the
//! calendar arithmetic they depend on.

pub mod boleto;
pub mod common;
pub mod filters;
pub mod installment;
pub mod schedule;

pub use boleto::*;
pub use common::*;
pub use filters::*;
pub use installment::*;
pub use schedule::*;

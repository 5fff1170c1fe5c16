//! Boleto Tracker registers installment receivables ("boletos"), tracks which
//! installments were paid and reports on the whole portfolio from the command line.

pub mod app;
pub mod errors;
pub mod output;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Boleto tracker tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}

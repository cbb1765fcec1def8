#![doc(test(attr(deny(warnings))))]

//! Cashflow Core expands recurring incomes and expenses into the dated
//! occurrences that fall inside a query window, and carries the small set of
//! session-level helpers (in-memory book, totals, currency display) that
//! consume them.

pub mod config;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Cashflow Core tracing initialized.");
    });
}

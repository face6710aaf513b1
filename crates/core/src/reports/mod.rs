//! Read-only reporting.
//!
//! Pure queries over the posted journal:
//! - Account Ledger (opening balance, movements, running balance)
//! - Trial Balance

pub mod service;
pub mod types;

pub use service::LedgerQueries;
pub use types::{
    LedgerLine, LedgerReport, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};

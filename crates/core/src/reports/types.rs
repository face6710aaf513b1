//! Report shapes returned by the query service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saldo_shared::types::{AccountCode, CompanyId, JournalEntryId};

use crate::accounts::types::AccountType;
use crate::journal::entry::EntryNumber;

/// One movement on an account, with the balance after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Entry date.
    pub date: NaiveDate,
    /// Entry the movement belongs to.
    pub entry_id: JournalEntryId,
    /// Human-facing entry number.
    pub entry_number: EntryNumber,
    /// Entry description.
    pub description: String,
    /// Line memo, when one was given.
    pub memo: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this movement, in the account's normal balance.
    pub running_balance: Decimal,
}

/// An account's ledger over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerReport {
    /// The account reported on.
    pub account: AccountCode,
    /// First day of the range, inclusive.
    pub start_date: NaiveDate,
    /// Last day of the range, inclusive.
    pub end_date: NaiveDate,
    /// Balance carried into the range from all earlier posted activity.
    pub opening_balance: Decimal,
    /// Movements within the range, oldest first.
    pub lines: Vec<LedgerLine>,
    /// Balance after the last movement: the opening balance plus every
    /// movement in the range.
    pub closing_balance: Decimal,
}

/// One account row of a trial balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account code.
    pub account: AccountCode,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Total posted debits.
    pub total_debit: Decimal,
    /// Total posted credits.
    pub total_credit: Decimal,
    /// Current balance in the account's normal balance.
    pub balance: Decimal,
}

/// Column totals over a whole trial balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Sum of all debit columns.
    pub total_debit: Decimal,
    /// Sum of all credit columns.
    pub total_credit: Decimal,
    /// Whether the two sides agree.
    pub is_balanced: bool,
}

/// A company's trial balance over all posted activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Company reported on.
    pub company_id: CompanyId,
    /// One row per account, in code order.
    pub rows: Vec<TrialBalanceRow>,
    /// Column totals.
    pub totals: TrialBalanceTotals,
}

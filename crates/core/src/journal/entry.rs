//! Journal entry types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saldo_shared::types::{AccountCode, CompanyId, DocumentId, JournalEntryId};

/// A single debit or credit line of a journal entry.
///
/// Exactly one of `debit` and `credit` is nonzero on a valid line. Input
/// rows with both sides zero are treated as incomplete drafts and dropped
/// during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// The account this line posts to.
    pub account: AccountCode,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Optional line memo.
    pub memo: Option<String>,
}

impl JournalLine {
    /// Creates a debit line.
    pub fn debit(account: impl Into<AccountCode>, amount: Decimal) -> Self {
        Self {
            account: account.into(),
            debit: amount,
            credit: Decimal::ZERO,
            memo: None,
        }
    }

    /// Creates a credit line.
    pub fn credit(account: impl Into<AccountCode>, amount: Decimal) -> Self {
        Self {
            account: account.into(),
            debit: Decimal::ZERO,
            credit: amount,
            memo: None,
        }
    }

    /// Attaches a memo to the line.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Returns true if both sides are zero (an incomplete draft row).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.debit == Decimal::ZERO && self.credit == Decimal::ZERO
    }
}

/// Company-scoped sequential entry number.
///
/// Numbers are allocated monotonically per company and never reused, even
/// after an entry is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryNumber(i64);

impl EntryNumber {
    /// Wraps a raw sequence value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for EntryNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JE-{:06}", self.0)
    }
}

/// Where a journal entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Entered by hand through the journal store.
    Manual,
    /// Generated by posting a business document.
    Document(DocumentId),
    /// Generated by period closing. Immutable regardless of company policy.
    Closing,
}

impl EntrySource {
    /// Returns true for closing entries.
    #[must_use]
    pub const fn is_closing(&self) -> bool {
        matches!(self, Self::Closing)
    }
}

/// A journal entry: a dated, balanced set of debit/credit lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Company this entry belongs to.
    pub company_id: CompanyId,
    /// Company-scoped sequential number.
    pub entry_number: EntryNumber,
    /// Accounting date of the entry.
    pub date: NaiveDate,
    /// Human-readable description.
    pub description: String,
    /// The entry's lines. Always balanced for stored entries.
    pub lines: Vec<JournalLine>,
    /// Where the entry came from.
    pub source: EntrySource,
    /// Whether the entry has been posted to account balances.
    pub is_posted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Sum of all debit amounts.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of all credit amounts.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    /// Company the entry belongs to.
    pub company_id: CompanyId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Human-readable description.
    pub description: String,
    /// The entry's lines. Blank rows are dropped before validation.
    pub lines: Vec<JournalLine>,
}

/// Input for updating a journal entry. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct JournalEntryUpdate {
    /// New accounting date.
    pub date: Option<NaiveDate>,
    /// New description.
    pub description: Option<String>,
    /// Replacement lines. Blank rows are dropped before validation.
    pub lines: Option<Vec<JournalLine>>,
}

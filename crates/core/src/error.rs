//! Error types for ledger operations.
//!
//! This module defines all errors that can occur during engine operations:
//! entry validation errors, account errors, document posting errors, period
//! closing errors, and entry state errors. Every error is detected before
//! any state is mutated, so a returned error always means "nothing changed".

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use saldo_shared::types::{AccountCode, CompanyId, DocumentId, JournalEntryId};

use crate::posting::documents::{DefaultAccountKind, DocumentKind};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Entry Validation Errors ==========
    /// Entry has no effective lines after dropping blank rows.
    #[error("Journal entry has no effective lines")]
    EmptyEntry,

    /// Entry is not balanced (debits != credits).
    #[error("Journal entry is unbalanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// A line sets both the debit and the credit side.
    #[error("Line for account {account} sets both debit and credit")]
    BothSidesSet {
        /// The account on the offending line.
        account: AccountCode,
    },

    /// A line carries a negative amount.
    #[error("Line for account {account} has a negative amount")]
    NegativeAmount {
        /// The account on the offending line.
        account: AccountCode,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountCode),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountCode),

    /// Account belongs to a different company than the operation.
    #[error("Account {account} belongs to a different company")]
    AccountCompanyMismatch {
        /// The account on the offending line.
        account: AccountCode,
    },

    /// An account with this code already exists.
    #[error("Account code {0} already exists")]
    DuplicateAccount(AccountCode),

    /// The referenced parent account does not exist.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountCode),

    /// The proposed parent would make the account its own ancestor.
    #[error("Setting parent {parent} on account {account} creates a cycle")]
    CyclicParent {
        /// The account being created or updated.
        account: AccountCode,
        /// The proposed parent.
        parent: AccountCode,
    },

    /// Account type cannot change once the account has posted entries.
    #[error("Cannot change type of account {0} because it has posted entries")]
    TypeChangeWithPostings(AccountCode),

    /// Account cannot be removed while journal entries or children reference it.
    #[error("Account {0} is referenced by journal entries or child accounts")]
    AccountReferenced(AccountCode),

    // ========== Document Posting Errors ==========
    /// No default account is configured for the required role.
    #[error("No default account configured for {0}")]
    MissingDefaultAccount(DefaultAccountKind),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Document is registered under a different kind.
    #[error("Document {document} is a {actual} document, expected {expected}")]
    DocumentKindMismatch {
        /// The document being posted.
        document: DocumentId,
        /// The kind the posting operation expected.
        expected: DocumentKind,
        /// The kind the document was registered with.
        actual: DocumentKind,
    },

    /// Document has already been posted.
    #[error("Document {0} is already posted")]
    AlreadyPosted(DocumentId),

    /// Document total must be positive.
    #[error("Document total {total} must be positive")]
    NonPositiveTotal {
        /// The rejected total.
        total: Decimal,
    },

    /// Exchange rate must be positive.
    #[error("Exchange rate {rate} must be positive")]
    InvalidExchangeRate {
        /// The rejected rate.
        rate: Decimal,
    },

    // ========== Entry State Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Posted entries may only be edited when company policy allows it.
    #[error("Journal entry {0} is posted and company policy forbids editing")]
    EditPostedForbidden(JournalEntryId),

    /// Closing entries can never be edited or deleted.
    #[error("Journal entry {0} is a closing entry and is immutable")]
    ClosingEntryImmutable(JournalEntryId),

    // ========== Period Errors ==========
    /// The date falls into an already-closed period.
    #[error("Date {date} falls in a closed period (closed through {closed_through})")]
    PeriodClosed {
        /// The rejected date.
        date: NaiveDate,
        /// The company's last closing date.
        closed_through: NaiveDate,
    },

    /// Closing is blocked by unposted documents in the period.
    #[error("Cannot close through {upto}: {unposted} unposted documents in the period")]
    PeriodCloseBlocked {
        /// The requested closing date.
        upto: NaiveDate,
        /// Number of unposted documents dated on or before `upto`.
        unposted: usize,
    },

    // ========== Company Errors ==========
    /// Company not found.
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),
}

impl LedgerError {
    /// Returns the stable error code for outbound boundaries.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::BothSidesSet { .. } => "BOTH_SIDES_SET",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountCompanyMismatch { .. } => "ACCOUNT_COMPANY_MISMATCH",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::CyclicParent { .. } => "CYCLIC_PARENT",
            Self::TypeChangeWithPostings(_) => "TYPE_CHANGE_WITH_POSTINGS",
            Self::AccountReferenced(_) => "ACCOUNT_REFERENCED",
            Self::MissingDefaultAccount(_) => "MISSING_DEFAULT_ACCOUNT",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::DocumentKindMismatch { .. } => "DOCUMENT_KIND_MISMATCH",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::NonPositiveTotal { .. } => "NON_POSITIVE_TOTAL",
            Self::InvalidExchangeRate { .. } => "INVALID_EXCHANGE_RATE",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::EditPostedForbidden(_) => "EDIT_POSTED_FORBIDDEN",
            Self::ClosingEntryImmutable(_) => "CLOSING_ENTRY_IMMUTABLE",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::PeriodCloseBlocked { .. } => "PERIOD_CLOSE_BLOCKED",
            Self::CompanyNotFound(_) => "COMPANY_NOT_FOUND",
        }
    }
}

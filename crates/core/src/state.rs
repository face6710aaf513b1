//! The engine's single logical store and the shared [`Ledger`] handle.
//!
//! All companies, accounts, journal entries, and document records live in
//! one [`LedgerState`] behind an `RwLock`. Components validate an operation
//! completely against the locked state and only then mutate, so every
//! operation is all-or-nothing and readers never observe a half-applied
//! change.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use saldo_shared::config::EngineConfig;
use saldo_shared::types::{AccountCode, CompanyId, DocumentId, JournalEntryId};

use crate::accounts::registry::AccountRegistry;
use crate::accounts::types::Account;
use crate::balance::projector::BalanceProjector;
use crate::closing::ClosingService;
use crate::company::{Company, CompanyRegistry};
use crate::error::LedgerError;
use crate::journal::entry::{EntryNumber, JournalEntry};
use crate::journal::store::JournalStore;
use crate::posting::coordinator::PostingCoordinator;
use crate::posting::documents::DocumentRecord;
use crate::reports::service::LedgerQueries;

/// All engine data. Accounts are keyed by code so iteration follows the
/// chart order; companies, entries, and documents are keyed by id.
#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub(crate) config: EngineConfig,
    pub(crate) companies: HashMap<CompanyId, Company>,
    pub(crate) accounts: BTreeMap<AccountCode, Account>,
    pub(crate) entries: HashMap<JournalEntryId, JournalEntry>,
    pub(crate) documents: HashMap<DocumentId, DocumentRecord>,
}

impl LedgerState {
    pub(crate) fn company(&self, company_id: CompanyId) -> Result<&Company, LedgerError> {
        self.companies
            .get(&company_id)
            .ok_or(LedgerError::CompanyNotFound(company_id))
    }

    pub(crate) fn company_mut(
        &mut self,
        company_id: CompanyId,
    ) -> Result<&mut Company, LedgerError> {
        self.companies
            .get_mut(&company_id)
            .ok_or(LedgerError::CompanyNotFound(company_id))
    }

    pub(crate) fn account(&self, code: &AccountCode) -> Result<&Account, LedgerError> {
        self.accounts
            .get(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.clone()))
    }

    pub(crate) fn entry(&self, id: JournalEntryId) -> Result<&JournalEntry, LedgerError> {
        self.entries.get(&id).ok_or(LedgerError::EntryNotFound(id))
    }

    pub(crate) fn document(&self, id: DocumentId) -> Result<&DocumentRecord, LedgerError> {
        self.documents
            .get(&id)
            .ok_or(LedgerError::DocumentNotFound(id))
    }

    /// Takes the next value of the company's entry number sequence.
    /// Numbers are handed out exactly once and never reused, even when the
    /// entry they were allocated for is later deleted.
    pub(crate) fn allocate_entry_number(
        &mut self,
        company_id: CompanyId,
    ) -> Result<EntryNumber, LedgerError> {
        let company = self.company_mut(company_id)?;
        let number = EntryNumber::new(company.next_entry_number);
        company.next_entry_number += 1;
        Ok(number)
    }

    /// Rejects `date` when it falls on or before the company's last closing
    /// date.
    pub(crate) fn ensure_period_open(
        &self,
        company: &Company,
        date: NaiveDate,
    ) -> Result<(), LedgerError> {
        if let Some(closed_through) = company.last_closing_date {
            if date <= closed_through {
                return Err(LedgerError::PeriodClosed {
                    date,
                    closed_through,
                });
            }
        }
        Ok(())
    }

    /// Whether any posted entry has a line on `code`.
    pub(crate) fn account_has_posted_lines(&self, code: &AccountCode) -> bool {
        self.entries.values().any(|entry| {
            entry.is_posted && entry.lines.iter().any(|line| &line.account == code)
        })
    }
}

/// Cloneable handle to the engine state.
///
/// Every component borrows the same state through a shared handle, so a
/// registry, store, and coordinator obtained from the same `Ledger` always
/// agree. Construct one per dataset and pass it to whatever needs it.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    inner: Arc<RwLock<LedgerState>>,
}

impl Ledger {
    /// Creates an empty ledger with default engine configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty ledger with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerState {
                config,
                ..LedgerState::default()
            })),
        }
    }

    // A poisoned lock only means a panic elsewhere while holding the guard;
    // writers mutate strictly after validation, so the state behind the lock
    // is still consistent and we keep serving it.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Company registry backed by this ledger.
    #[must_use]
    pub fn companies(&self) -> CompanyRegistry {
        CompanyRegistry::new(self.clone())
    }

    /// Account registry backed by this ledger.
    #[must_use]
    pub fn accounts(&self) -> AccountRegistry {
        AccountRegistry::new(self.clone())
    }

    /// Journal entry store backed by this ledger.
    #[must_use]
    pub fn journal(&self) -> JournalStore {
        JournalStore::new(self.clone())
    }

    /// Balance projector backed by this ledger.
    #[must_use]
    pub fn balances(&self) -> BalanceProjector {
        BalanceProjector::new(self.clone())
    }

    /// Document posting coordinator backed by this ledger.
    #[must_use]
    pub fn posting(&self) -> PostingCoordinator {
        PostingCoordinator::new(self.clone())
    }

    /// Period closing service backed by this ledger.
    #[must_use]
    pub fn closing(&self) -> ClosingService {
        ClosingService::new(self.clone())
    }

    /// Read-only ledger and trial balance queries backed by this ledger.
    #[must_use]
    pub fn reports(&self) -> LedgerQueries {
        LedgerQueries::new(self.clone())
    }
}

//! Chart-of-accounts management: creation, updates, lifecycle, removal.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use saldo_shared::types::{AccountCode, CompanyId};

use crate::accounts::hierarchy;
use crate::accounts::types::{Account, AccountNode, AccountUpdate, NewAccount, ParentChange};
use crate::error::LedgerError;
use crate::state::Ledger;

/// Manages the chart of accounts.
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    ledger: Ledger,
}

impl AccountRegistry {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Creates an account. Codes are unique across the whole chart; the
    /// parent, when given, must exist in the same company.
    pub fn create(&self, input: NewAccount) -> Result<Account, LedgerError> {
        let mut state = self.ledger.write();
        state.company(input.company_id)?;
        if state.accounts.contains_key(&input.code) {
            return Err(LedgerError::DuplicateAccount(input.code));
        }
        if let Some(parent) = &input.parent {
            hierarchy::ensure_acyclic(&state.accounts, &input.code, parent)?;
            let parent_account = state
                .accounts
                .get(parent)
                .ok_or_else(|| LedgerError::ParentNotFound(parent.clone()))?;
            if parent_account.company_id != input.company_id {
                return Err(LedgerError::AccountCompanyMismatch {
                    account: parent.clone(),
                });
            }
        }

        let now = Utc::now();
        let account = Account {
            code: input.code,
            company_id: input.company_id,
            name: input.name,
            account_type: input.account_type,
            parent: input.parent,
            balance: Decimal::ZERO,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.accounts.insert(account.code.clone(), account.clone());
        info!(
            account = %account.code,
            account_type = %account.account_type,
            "Account created"
        );
        Ok(account)
    }

    /// Updates name, type, or parent of an account.
    ///
    /// The type cannot change once the account appears on a posted entry:
    /// the sign convention baked into its balance would silently flip.
    /// Reparenting is checked against the hierarchy so no cycle can form.
    pub fn update(
        &self,
        code: &AccountCode,
        update: AccountUpdate,
    ) -> Result<Account, LedgerError> {
        let mut state = self.ledger.write();
        let existing = state.account(code)?.clone();

        if let Some(new_type) = update.account_type {
            if new_type != existing.account_type && state.account_has_posted_lines(code) {
                return Err(LedgerError::TypeChangeWithPostings(code.clone()));
            }
        }
        if let ParentChange::MoveUnder(parent) = &update.parent {
            hierarchy::ensure_acyclic(&state.accounts, code, parent)?;
            let parent_account = state
                .accounts
                .get(parent)
                .ok_or_else(|| LedgerError::ParentNotFound(parent.clone()))?;
            if parent_account.company_id != existing.company_id {
                return Err(LedgerError::AccountCompanyMismatch {
                    account: parent.clone(),
                });
            }
        }

        let account = state.accounts.get_mut(code).ok_or_else(|| {
            LedgerError::AccountNotFound(code.clone())
        })?;
        if let Some(name) = update.name {
            account.name = name;
        }
        if let Some(new_type) = update.account_type {
            account.account_type = new_type;
        }
        match update.parent {
            ParentChange::Unchanged => {}
            ParentChange::MakeRoot => account.parent = None,
            ParentChange::MoveUnder(parent) => account.parent = Some(parent),
        }
        account.updated_at = Utc::now();
        let account = account.clone();
        debug!(account = %code, "Account updated");
        Ok(account)
    }

    /// Deactivates an account. Inactive accounts keep their balance and
    /// history but reject new postings.
    pub fn deactivate(&self, code: &AccountCode) -> Result<Account, LedgerError> {
        self.set_active(code, false)
    }

    /// Reactivates a previously deactivated account.
    pub fn reactivate(&self, code: &AccountCode) -> Result<Account, LedgerError> {
        self.set_active(code, true)
    }

    fn set_active(&self, code: &AccountCode, active: bool) -> Result<Account, LedgerError> {
        let mut state = self.ledger.write();
        let account = state.accounts.get_mut(code).ok_or_else(|| {
            LedgerError::AccountNotFound(code.clone())
        })?;
        account.is_active = active;
        account.updated_at = Utc::now();
        let account = account.clone();
        debug!(account = %code, active, "Account lifecycle changed");
        Ok(account)
    }

    /// Removes an account outright. Blocked while any child account or any
    /// journal entry, draft or posted, still references it; deactivation is
    /// the way to retire an account with history.
    pub fn remove(&self, code: &AccountCode) -> Result<(), LedgerError> {
        let mut state = self.ledger.write();
        state.account(code)?;
        let has_children = state
            .accounts
            .values()
            .any(|account| account.parent.as_ref() == Some(code));
        let on_entries = state
            .entries
            .values()
            .any(|entry| entry.lines.iter().any(|line| &line.account == code));
        if has_children || on_entries {
            return Err(LedgerError::AccountReferenced(code.clone()));
        }
        state.accounts.remove(code);
        info!(account = %code, "Account removed");
        Ok(())
    }

    /// Fetches an account by code.
    pub fn get(&self, code: &AccountCode) -> Result<Account, LedgerError> {
        self.ledger.read().account(code).cloned()
    }

    /// The company's chart as a depth-first pre-order listing, children
    /// under each node sorted by code. Inactive accounts are included.
    pub fn hierarchy(&self, company_id: CompanyId) -> Result<Vec<AccountNode>, LedgerError> {
        let state = self.ledger.read();
        state.company(company_id)?;
        Ok(hierarchy::hierarchy(&state.accounts, company_id))
    }
}

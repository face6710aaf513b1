//! Balance projection: incremental deltas and full recomputation.
//!
//! Stores keep balances current by applying per-entry delta sets inside the
//! same state mutation that changes the entry, so balances and entries can
//! never disagree. [`BalanceProjector::recalculate`] is the recovery path:
//! it replays every posted entry of a company from scratch and must land on
//! exactly the balances incremental maintenance produced.

use std::collections::BTreeMap;

use chrono::Utc;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::info;

use saldo_shared::types::{AccountCode, CompanyId};

use crate::error::LedgerError;
use crate::journal::entry::{JournalEntry, JournalLine};
use crate::state::{Ledger, LedgerState};

/// Per-account debit and credit accumulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SideTotals {
    pub(crate) debit: Decimal,
    pub(crate) credit: Decimal,
}

/// Balance deltas keyed by account code.
pub(crate) type DeltaMap = BTreeMap<AccountCode, SideTotals>;

/// The deltas posting `lines` fresh would apply.
pub(crate) fn posting_deltas(lines: &[JournalLine]) -> DeltaMap {
    delta_between(&[], lines)
}

/// The deltas that replacing posted `old` lines with `new` lines applies.
///
/// Old lines contribute negatively and new ones positively, collapsing
/// reverse-then-reapply into a single delta set. An account appearing
/// unchanged on both sides drops out entirely.
pub(crate) fn delta_between(old: &[JournalLine], new: &[JournalLine]) -> DeltaMap {
    let mut deltas = DeltaMap::new();
    for line in new {
        let totals = deltas.entry(line.account.clone()).or_default();
        totals.debit += line.debit;
        totals.credit += line.credit;
    }
    for line in old {
        let totals = deltas.entry(line.account.clone()).or_default();
        totals.debit -= line.debit;
        totals.credit -= line.credit;
    }
    deltas.retain(|_, totals| {
        totals.debit != Decimal::ZERO || totals.credit != Decimal::ZERO
    });
    deltas
}

fn merge_deltas(mut left: DeltaMap, right: DeltaMap) -> DeltaMap {
    for (code, totals) in right {
        let merged = left.entry(code).or_default();
        merged.debit += totals.debit;
        merged.credit += totals.credit;
    }
    left
}

impl LedgerState {
    /// Verifies every account a delta set touches exists.
    ///
    /// Activeness is deliberately not required: reversing lines off an
    /// account must keep working after the account was deactivated.
    pub(crate) fn check_delta_accounts(&self, deltas: &DeltaMap) -> Result<(), LedgerError> {
        for code in deltas.keys() {
            self.account(code)?;
        }
        Ok(())
    }

    /// Applies a checked delta set to account balances.
    pub(crate) fn apply_deltas(&mut self, deltas: &DeltaMap) {
        let now = Utc::now();
        for (code, totals) in deltas {
            if let Some(account) = self.accounts.get_mut(code) {
                account.balance += account
                    .account_type
                    .balance_change(totals.debit, totals.credit);
                account.updated_at = now;
            }
        }
    }

    /// Rewrites every balance of the company from its posted entries.
    pub(crate) fn recalculate_company(
        &mut self,
        company_id: CompanyId,
    ) -> Result<RecalculationSummary, LedgerError> {
        self.company(company_id)?;
        let posted: Vec<&JournalEntry> = self
            .entries
            .values()
            .filter(|entry| entry.company_id == company_id && entry.is_posted)
            .collect();
        let entries_replayed = posted.len();
        let totals = posted
            .par_iter()
            .map(|entry| posting_deltas(&entry.lines))
            .reduce(DeltaMap::new, merge_deltas);
        self.check_delta_accounts(&totals)?;

        let now = Utc::now();
        let mut accounts_updated = 0;
        for account in self
            .accounts
            .values_mut()
            .filter(|account| account.company_id == company_id)
        {
            let side = totals.get(&account.code).copied().unwrap_or_default();
            account.balance = account.account_type.balance_change(side.debit, side.credit);
            account.updated_at = now;
            accounts_updated += 1;
        }
        Ok(RecalculationSummary {
            accounts_updated,
            entries_replayed,
        })
    }
}

/// Outcome of a full balance recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecalculationSummary {
    /// Accounts whose balance was rewritten.
    pub accounts_updated: usize,
    /// Posted entries replayed.
    pub entries_replayed: usize,
}

/// Rebuilds account balances from the posted journal.
#[derive(Debug, Clone)]
pub struct BalanceProjector {
    ledger: Ledger,
}

impl BalanceProjector {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Recomputes every account balance of the company by replaying its
    /// posted entries. Draft entries contribute nothing.
    pub fn recalculate(
        &self,
        company_id: CompanyId,
    ) -> Result<RecalculationSummary, LedgerError> {
        let mut state = self.ledger.write();
        let summary = state.recalculate_company(company_id)?;
        info!(
            company_id = %company_id,
            accounts = summary.accounts_updated,
            entries = summary.entries_replayed,
            "Balances recalculated"
        );
        Ok(summary)
    }
}

//! Read-only ledger and trial balance queries.
//!
//! Queries never mutate anything: they fold the posted journal into report
//! shapes under a read lock. The closing balance a ledger report ends on is
//! definitionally the account's stored balance when the range covers all
//! activity, which makes these reports a cheap cross-check on incremental
//! balance maintenance.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use saldo_shared::types::{AccountCode, CompanyId};

use crate::balance::projector::SideTotals;
use crate::error::LedgerError;
use crate::reports::types::{
    LedgerLine, LedgerReport, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};
use crate::state::Ledger;

/// Read queries over the posted journal.
#[derive(Debug, Clone)]
pub struct LedgerQueries {
    ledger: Ledger,
}

impl LedgerQueries {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// An account's ledger over `[start_date, end_date]`.
    ///
    /// The opening balance folds all posted activity before the range;
    /// each movement inside the range carries the balance after it, in the
    /// account's normal balance; the closing balance is the running
    /// balance after the last movement. Draft entries never appear.
    pub fn ledger(
        &self,
        account_code: &AccountCode,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<LedgerReport, LedgerError> {
        let state = self.ledger.read();
        let account = state.account(account_code)?;
        let normal = account.account_type.normal_balance();

        let mut opening_balance = Decimal::ZERO;
        let mut lines: Vec<LedgerLine> = Vec::new();
        for entry in state.entries.values().filter(|entry| entry.is_posted) {
            for line in entry
                .lines
                .iter()
                .filter(|line| &line.account == account_code)
            {
                if entry.date < start_date {
                    opening_balance += normal.balance_change(line.debit, line.credit);
                } else if entry.date <= end_date {
                    lines.push(LedgerLine {
                        date: entry.date,
                        entry_id: entry.id,
                        entry_number: entry.entry_number,
                        description: entry.description.clone(),
                        memo: line.memo.clone(),
                        debit: line.debit,
                        credit: line.credit,
                        running_balance: Decimal::ZERO,
                    });
                }
            }
        }
        lines.sort_by_key(|line| (line.date, line.entry_number));
        let mut running = opening_balance;
        for line in &mut lines {
            running += normal.balance_change(line.debit, line.credit);
            line.running_balance = running;
        }

        Ok(LedgerReport {
            account: account_code.clone(),
            start_date,
            end_date,
            opening_balance,
            lines,
            closing_balance: running,
        })
    }

    /// The company's trial balance over all posted activity, one row per
    /// account in code order. Accounts without activity appear with zero
    /// totals.
    pub fn trial_balance(&self, company_id: CompanyId) -> Result<TrialBalanceReport, LedgerError> {
        let state = self.ledger.read();
        state.company(company_id)?;

        let mut per_account: BTreeMap<&AccountCode, SideTotals> = BTreeMap::new();
        for entry in state
            .entries
            .values()
            .filter(|entry| entry.company_id == company_id && entry.is_posted)
        {
            for line in &entry.lines {
                let totals = per_account.entry(&line.account).or_default();
                totals.debit += line.debit;
                totals.credit += line.credit;
            }
        }

        let mut rows = Vec::new();
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;
        for account in state
            .accounts
            .values()
            .filter(|account| account.company_id == company_id)
        {
            let side = per_account.get(&account.code).copied().unwrap_or_default();
            total_debit += side.debit;
            total_credit += side.credit;
            rows.push(TrialBalanceRow {
                account: account.code.clone(),
                name: account.name.clone(),
                account_type: account.account_type,
                total_debit: side.debit,
                total_credit: side.credit,
                balance: account.balance,
            });
        }

        Ok(TrialBalanceReport {
            company_id,
            rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        })
    }
}

//! Period closing: the closing gate and closing-entry generation.
//!
//! Closing through a date freezes everything on or before it: no entry or
//! document may be created, posted, edited, or deleted there afterwards.
//! The gate refuses to close while unposted documents remain in the
//! period. Closing entries zero every revenue and expense account over the
//! window since the previous close and roll the net result into retained
//! earnings.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use saldo_shared::types::{AccountCode, CompanyId};

use crate::accounts::types::{AccountType, NormalBalance};
use crate::error::LedgerError;
use crate::journal::entry::{EntrySource, JournalEntry, JournalLine, NewJournalEntry};
use crate::posting::documents::{DefaultAccountKind, DefaultAccounts};
use crate::state::{Ledger, LedgerState};

/// Closes accounting periods and generates closing entries.
#[derive(Debug, Clone)]
pub struct ClosingService {
    ledger: Ledger,
}

impl ClosingService {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Closes the books through `upto` without generating closing entries.
    ///
    /// Fails while any unposted document dated on or before `upto` remains.
    /// Re-closing through the same date is a no-op; closing through an
    /// earlier date than the current close is rejected.
    pub fn close_period(&self, company_id: CompanyId, upto: NaiveDate) -> Result<(), LedgerError> {
        let mut state = self.ledger.write();
        check_close_allowed(&state, company_id, upto)?;
        set_closing_date(&mut state, company_id, upto)?;
        info!(company_id = %company_id, %upto, "Period closed");
        Ok(())
    }

    /// Zeroes revenue and expense activity in the window after the last
    /// close through `upto` into retained earnings, as one posted,
    /// immutable entry dated `upto`.
    ///
    /// Returns `None` when the window holds no activity, so running it
    /// again produces nothing new.
    pub fn generate_closing_entries(
        &self,
        company_id: CompanyId,
        upto: NaiveDate,
        defaults: &DefaultAccounts,
    ) -> Result<Option<JournalEntry>, LedgerError> {
        let mut state = self.ledger.write();
        let entry = generate_in(&mut state, company_id, upto, defaults)?;
        if let Some(entry) = &entry {
            info!(
                company_id = %company_id,
                entry_number = %entry.entry_number,
                "Closing entries generated"
            );
        }
        Ok(entry)
    }

    /// Generates closing entries and closes the period in one step. The
    /// closing gate is checked before anything is written.
    pub fn close_period_with_entries(
        &self,
        company_id: CompanyId,
        upto: NaiveDate,
        defaults: &DefaultAccounts,
    ) -> Result<Option<JournalEntry>, LedgerError> {
        let mut state = self.ledger.write();
        check_close_allowed(&state, company_id, upto)?;
        let entry = generate_in(&mut state, company_id, upto, defaults)?;
        set_closing_date(&mut state, company_id, upto)?;
        info!(
            company_id = %company_id,
            %upto,
            generated = entry.is_some(),
            "Period closed"
        );
        Ok(entry)
    }
}

fn check_close_allowed(
    state: &LedgerState,
    company_id: CompanyId,
    upto: NaiveDate,
) -> Result<(), LedgerError> {
    let company = state.company(company_id)?;
    if let Some(closed_through) = company.last_closing_date {
        if upto < closed_through {
            return Err(LedgerError::PeriodClosed {
                date: upto,
                closed_through,
            });
        }
    }
    let unposted = state
        .documents
        .values()
        .filter(|document| {
            document.company_id == company_id && !document.posted && document.date <= upto
        })
        .count();
    if unposted > 0 {
        return Err(LedgerError::PeriodCloseBlocked { upto, unposted });
    }
    Ok(())
}

fn set_closing_date(
    state: &mut LedgerState,
    company_id: CompanyId,
    upto: NaiveDate,
) -> Result<(), LedgerError> {
    let company = state.company_mut(company_id)?;
    if company.last_closing_date != Some(upto) {
        company.last_closing_date = Some(upto);
        company.updated_at = Utc::now();
    }
    Ok(())
}

fn in_window(date: NaiveDate, after: Option<NaiveDate>, upto: NaiveDate) -> bool {
    date <= upto && after.is_none_or(|start| date > start)
}

fn generate_in(
    state: &mut LedgerState,
    company_id: CompanyId,
    upto: NaiveDate,
    defaults: &DefaultAccounts,
) -> Result<Option<JournalEntry>, LedgerError> {
    let company = state.company(company_id)?;
    let window_start = company.last_closing_date;
    // A window that ends inside the closed range is already zeroed.
    if window_start.is_some_and(|closed| upto <= closed) {
        return Ok(None);
    }

    // Net movement per temporary account, in its own normal balance.
    let mut nets: BTreeMap<AccountCode, (AccountType, Decimal)> = BTreeMap::new();
    for entry in state.entries.values().filter(|entry| {
        entry.company_id == company_id
            && entry.is_posted
            && in_window(entry.date, window_start, upto)
    }) {
        for line in &entry.lines {
            let Some(account) = state.accounts.get(&line.account) else {
                continue;
            };
            if !account.account_type.is_temporary() {
                continue;
            }
            let slot = nets
                .entry(line.account.clone())
                .or_insert((account.account_type, Decimal::ZERO));
            slot.1 += account.account_type.balance_change(line.debit, line.credit);
        }
    }
    nets.retain(|_, (_, net)| *net != Decimal::ZERO);
    if nets.is_empty() {
        return Ok(None);
    }

    let mut lines = Vec::with_capacity(nets.len() + 1);
    let mut profit = Decimal::ZERO;
    for (code, (account_type, net)) in &nets {
        match account_type {
            AccountType::Revenue => profit += *net,
            AccountType::Expense => profit -= *net,
            _ => {}
        }
        // The offsetting line applies -net in the account's own convention.
        let line = match (account_type.normal_balance(), *net > Decimal::ZERO) {
            (NormalBalance::Debit, true) => JournalLine::credit(code.clone(), *net),
            (NormalBalance::Debit, false) => JournalLine::debit(code.clone(), -*net),
            (NormalBalance::Credit, true) => JournalLine::debit(code.clone(), *net),
            (NormalBalance::Credit, false) => JournalLine::credit(code.clone(), -*net),
        };
        lines.push(line);
    }
    if profit != Decimal::ZERO {
        let retained = defaults
            .require(DefaultAccountKind::RetainedEarnings)?
            .clone();
        lines.push(if profit > Decimal::ZERO {
            JournalLine::credit(retained, profit)
        } else {
            JournalLine::debit(retained, -profit)
        });
    }

    let entry = state.create_posted_entry(
        NewJournalEntry {
            company_id,
            date: upto,
            description: format!("Closing entries through {upto}"),
            lines,
        },
        EntrySource::Closing,
    )?;
    Ok(Some(entry))
}

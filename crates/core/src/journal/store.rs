//! Journal entry store: create, update, post, and delete.
//!
//! Entries are drafts until posted; only posted entries move balances.
//! Every mutation validates completely against the locked state before
//! touching it, so an operation either lands in full (entry and balances
//! together) or leaves no trace.

use chrono::Utc;
use tracing::info;

use saldo_shared::types::{CompanyId, JournalEntryId};

use crate::balance::projector::{delta_between, posting_deltas};
use crate::error::LedgerError;
use crate::journal::entry::{
    EntrySource, JournalEntry, JournalEntryUpdate, JournalLine, NewJournalEntry,
};
use crate::journal::validation::{normalize_lines, validate_lines};
use crate::state::{Ledger, LedgerState};

impl LedgerState {
    /// Checks lines against the chart: every account must exist, be active,
    /// and belong to `company_id`.
    pub(crate) fn check_lines_against_chart(
        &self,
        company_id: CompanyId,
        lines: &[JournalLine],
    ) -> Result<(), LedgerError> {
        for line in lines {
            let account = self.account(&line.account)?;
            if account.company_id != company_id {
                return Err(LedgerError::AccountCompanyMismatch {
                    account: line.account.clone(),
                });
            }
            if !account.is_active {
                return Err(LedgerError::AccountInactive(line.account.clone()));
            }
        }
        Ok(())
    }

    /// Shared validation for new entries: normalizes lines, then checks
    /// balance, company, period, and chart. Returns the normalized lines.
    fn validate_new_entry(&self, input: &NewJournalEntry) -> Result<Vec<JournalLine>, LedgerError> {
        let lines = normalize_lines(input.lines.clone());
        validate_lines(&lines)?;
        let company = self.company(input.company_id)?;
        self.ensure_period_open(company, input.date)?;
        self.check_lines_against_chart(input.company_id, &lines)?;
        Ok(lines)
    }

    /// Creates a draft manual entry.
    pub(crate) fn create_draft_entry(
        &mut self,
        input: NewJournalEntry,
    ) -> Result<JournalEntry, LedgerError> {
        let lines = self.validate_new_entry(&input)?;
        let entry_number = self.allocate_entry_number(input.company_id)?;
        let now = Utc::now();
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            company_id: input.company_id,
            entry_number,
            date: input.date,
            description: input.description,
            lines,
            source: EntrySource::Manual,
            is_posted: false,
            created_at: now,
            updated_at: now,
        };
        self.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    /// Creates an entry that starts out posted, applying its balance deltas
    /// in the same mutation. Used by document posting and period closing.
    pub(crate) fn create_posted_entry(
        &mut self,
        input: NewJournalEntry,
        source: EntrySource,
    ) -> Result<JournalEntry, LedgerError> {
        let lines = self.validate_new_entry(&input)?;
        let deltas = posting_deltas(&lines);
        let entry_number = self.allocate_entry_number(input.company_id)?;
        let now = Utc::now();
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            company_id: input.company_id,
            entry_number,
            date: input.date,
            description: input.description,
            lines,
            source,
            is_posted: true,
            created_at: now,
            updated_at: now,
        };
        self.entries.insert(entry.id, entry.clone());
        self.apply_deltas(&deltas);
        Ok(entry)
    }

    /// Posts a draft. Idempotent: an already posted entry is returned
    /// unchanged, without touching balances again.
    pub(crate) fn post_entry(&mut self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let existing = self.entry(id)?.clone();
        if existing.is_posted {
            return Ok(existing);
        }
        let company = self.company(existing.company_id)?;
        self.ensure_period_open(company, existing.date)?;
        // Accounts may have been deactivated since the draft was written.
        self.check_lines_against_chart(existing.company_id, &existing.lines)?;
        let deltas = posting_deltas(&existing.lines);

        self.apply_deltas(&deltas);
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(LedgerError::EntryNotFound(id))?;
        entry.is_posted = true;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Updates an entry. Posted entries require the company's
    /// allow-edit-posted policy and adjust balances by the net difference
    /// between old and new lines, applied as one delta set.
    pub(crate) fn update_entry(
        &mut self,
        id: JournalEntryId,
        update: JournalEntryUpdate,
    ) -> Result<JournalEntry, LedgerError> {
        let existing = self.entry(id)?.clone();
        if existing.source.is_closing() {
            return Err(LedgerError::ClosingEntryImmutable(id));
        }
        let company = self.company(existing.company_id)?;
        if existing.is_posted {
            if !company.settings.allow_edit_posted {
                return Err(LedgerError::EditPostedForbidden(id));
            }
            self.ensure_period_open(company, existing.date)?;
        }
        // Drafts sitting inside a closed period may still be updated, but
        // only onto an open date; without that they could never be moved
        // out again.
        let new_date = update.date.unwrap_or(existing.date);
        self.ensure_period_open(company, new_date)?;

        let new_lines = match update.lines {
            Some(lines) => {
                let lines = normalize_lines(lines);
                validate_lines(&lines)?;
                self.check_lines_against_chart(existing.company_id, &lines)?;
                Some(lines)
            }
            None => None,
        };

        if existing.is_posted {
            if let Some(lines) = &new_lines {
                let deltas = delta_between(&existing.lines, lines);
                self.check_delta_accounts(&deltas)?;
                self.apply_deltas(&deltas);
            }
        }

        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(LedgerError::EntryNotFound(id))?;
        entry.date = new_date;
        if let Some(description) = update.description {
            entry.description = description;
        }
        if let Some(lines) = new_lines {
            entry.lines = lines;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Deletes an entry. Deleting a posted entry requires the company's
    /// allow-edit-posted policy and backs its effect out of the balances;
    /// the entry number is not reused.
    pub(crate) fn delete_entry(&mut self, id: JournalEntryId) -> Result<(), LedgerError> {
        let existing = self.entry(id)?.clone();
        if existing.source.is_closing() {
            return Err(LedgerError::ClosingEntryImmutable(id));
        }
        let company = self.company(existing.company_id)?;
        if existing.is_posted {
            if !company.settings.allow_edit_posted {
                return Err(LedgerError::EditPostedForbidden(id));
            }
            self.ensure_period_open(company, existing.date)?;
            let deltas = delta_between(&existing.lines, &[]);
            self.check_delta_accounts(&deltas)?;
            self.apply_deltas(&deltas);
        }
        self.entries.remove(&id);
        // The source document, if any, reverts to unposted.
        if let EntrySource::Document(document_id) = existing.source {
            if let Some(document) = self.documents.get_mut(&document_id) {
                document.posted = false;
                document.journal_entry_id = None;
            }
        }
        Ok(())
    }
}

/// Manages journal entries and their posting lifecycle.
#[derive(Debug, Clone)]
pub struct JournalStore {
    ledger: Ledger,
}

impl JournalStore {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Creates a draft entry. Lines must balance to a positive total;
    /// all-blank rows are dropped before validation.
    pub fn create(&self, input: NewJournalEntry) -> Result<JournalEntry, LedgerError> {
        let mut state = self.ledger.write();
        let entry = state.create_draft_entry(input)?;
        info!(
            entry_id = %entry.id,
            entry_number = %entry.entry_number,
            "Journal entry created"
        );
        Ok(entry)
    }

    /// Updates a draft, or a posted entry when the company allows it.
    pub fn update(
        &self,
        id: JournalEntryId,
        update: JournalEntryUpdate,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.ledger.write();
        let entry = state.update_entry(id, update)?;
        info!(entry_id = %entry.id, "Journal entry updated");
        Ok(entry)
    }

    /// Deletes a draft, or a posted entry when the company allows it.
    pub fn delete(&self, id: JournalEntryId) -> Result<(), LedgerError> {
        let mut state = self.ledger.write();
        state.delete_entry(id)?;
        info!(entry_id = %id, "Journal entry deleted");
        Ok(())
    }

    /// Posts a draft, applying its lines to account balances. Posting an
    /// already posted entry changes nothing.
    pub fn post(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let mut state = self.ledger.write();
        let entry = state.post_entry(id)?;
        info!(
            entry_id = %entry.id,
            entry_number = %entry.entry_number,
            "Journal entry posted"
        );
        Ok(entry)
    }

    /// Fetches an entry by id.
    pub fn get(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.ledger.read().entry(id).cloned()
    }

    /// All draft entries of the company, in entry number order.
    pub fn list_unposted(&self, company_id: CompanyId) -> Result<Vec<JournalEntry>, LedgerError> {
        let state = self.ledger.read();
        state.company(company_id)?;
        let mut drafts: Vec<JournalEntry> = state
            .entries
            .values()
            .filter(|entry| entry.company_id == company_id && !entry.is_posted)
            .cloned()
            .collect();
        drafts.sort_by_key(|entry| entry.entry_number);
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::types::{AccountType, NewAccount};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use saldo_shared::types::AccountCode;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, n).unwrap()
    }

    fn setup(allow_edit_posted: bool) -> (Ledger, CompanyId) {
        let ledger = Ledger::new();
        let company = ledger.companies().register("Acme Trading", "USD");
        if allow_edit_posted {
            ledger
                .companies()
                .set_allow_edit_posted(company.id, true)
                .unwrap();
        }
        let accounts = ledger.accounts();
        for (code, account_type) in [
            ("1101", AccountType::Asset),
            ("4001", AccountType::Revenue),
            ("5001", AccountType::Expense),
        ] {
            accounts
                .create(NewAccount {
                    code: code.into(),
                    company_id: company.id,
                    name: code.to_string(),
                    account_type,
                    parent: None,
                })
                .unwrap();
        }
        (ledger, company.id)
    }

    fn balance(ledger: &Ledger, code: &str) -> Decimal {
        ledger
            .accounts()
            .get(&AccountCode::from(code))
            .unwrap()
            .balance
    }

    fn simple_entry(company_id: CompanyId, amount: Decimal) -> NewJournalEntry {
        NewJournalEntry {
            company_id,
            date: day(15),
            description: "Cash sale".to_string(),
            lines: vec![
                JournalLine::debit("1101", amount),
                JournalLine::credit("4001", amount),
            ],
        }
    }

    #[test]
    fn test_draft_does_not_touch_balances() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let entry = journal.create(simple_entry(company_id, dec!(1000))).unwrap();
        assert!(!entry.is_posted);
        assert_eq!(entry.entry_number.to_string(), "JE-000001");
        assert_eq!(balance(&ledger, "1101"), dec!(0));
        assert_eq!(balance(&ledger, "4001"), dec!(0));
    }

    #[test]
    fn test_post_applies_both_sides() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let entry = journal.create(simple_entry(company_id, dec!(1000))).unwrap();
        journal.post(entry.id).unwrap();

        assert_eq!(balance(&ledger, "1101"), dec!(1000));
        assert_eq!(balance(&ledger, "4001"), dec!(1000));
    }

    #[test]
    fn test_post_is_idempotent() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let entry = journal.create(simple_entry(company_id, dec!(1000))).unwrap();
        journal.post(entry.id).unwrap();
        let again = journal.post(entry.id).unwrap();

        assert!(again.is_posted);
        // Second post must not double the balances.
        assert_eq!(balance(&ledger, "1101"), dec!(1000));
        assert_eq!(balance(&ledger, "4001"), dec!(1000));
    }

    #[test]
    fn test_create_rejects_invalid_lines() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let unbalanced = NewJournalEntry {
            lines: vec![
                JournalLine::debit("1101", dec!(100)),
                JournalLine::credit("4001", dec!(90)),
            ],
            ..simple_entry(company_id, dec!(0))
        };
        assert!(matches!(
            journal.create(unbalanced),
            Err(LedgerError::UnbalancedEntry { .. })
        ));

        let unknown_account = NewJournalEntry {
            lines: vec![
                JournalLine::debit("9999", dec!(100)),
                JournalLine::credit("4001", dec!(100)),
            ],
            ..simple_entry(company_id, dec!(0))
        };
        assert!(matches!(
            journal.create(unknown_account),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_create_rejects_other_companys_accounts() {
        let (ledger, company_id) = setup(false);
        let other = ledger.companies().register("Other Co", "USD");
        ledger
            .accounts()
            .create(NewAccount {
                code: "6001".into(),
                company_id: other.id,
                name: "Other revenue".to_string(),
                account_type: AccountType::Revenue,
                parent: None,
            })
            .unwrap();

        // Crediting another company's account must not slip through.
        let crossed = NewJournalEntry {
            lines: vec![
                JournalLine::debit("1101", dec!(100)),
                JournalLine::credit("6001", dec!(100)),
            ],
            ..simple_entry(company_id, dec!(0))
        };
        assert!(matches!(
            ledger.journal().create(crossed),
            Err(LedgerError::AccountCompanyMismatch { .. })
        ));
        assert_eq!(balance(&ledger, "1101"), dec!(0));
    }

    #[test]
    fn test_create_filters_blank_rows() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let input = NewJournalEntry {
            lines: vec![
                JournalLine::debit("1101", dec!(100)),
                JournalLine {
                    account: "5001".into(),
                    debit: dec!(0),
                    credit: dec!(0),
                    memo: None,
                },
                JournalLine::credit("4001", dec!(100)),
            ],
            ..simple_entry(company_id, dec!(0))
        };
        let entry = journal.create(input).unwrap();
        assert_eq!(entry.lines.len(), 2);
    }

    #[test]
    fn test_posting_to_inactive_account_rejected() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let entry = journal.create(simple_entry(company_id, dec!(100))).unwrap();
        ledger.accounts().deactivate(&"4001".into()).unwrap();

        assert!(matches!(
            journal.post(entry.id),
            Err(LedgerError::AccountInactive(_))
        ));
        // The draft itself is untouched by the failed post.
        assert!(!journal.get(entry.id).unwrap().is_posted);
    }

    #[test]
    fn test_posted_edit_requires_company_policy() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let entry = journal.create(simple_entry(company_id, dec!(1000))).unwrap();
        journal.post(entry.id).unwrap();

        let update = JournalEntryUpdate {
            lines: Some(vec![
                JournalLine::debit("1101", dec!(600)),
                JournalLine::credit("4001", dec!(600)),
            ]),
            ..JournalEntryUpdate::default()
        };
        assert!(matches!(
            journal.update(entry.id, update),
            Err(LedgerError::EditPostedForbidden(_))
        ));
        assert!(matches!(
            journal.delete(entry.id),
            Err(LedgerError::EditPostedForbidden(_))
        ));
        assert_eq!(balance(&ledger, "1101"), dec!(1000));
    }

    #[test]
    fn test_posted_edit_adjusts_balances_once() {
        let (ledger, company_id) = setup(true);
        let journal = ledger.journal();

        let entry = journal.create(simple_entry(company_id, dec!(1000))).unwrap();
        journal.post(entry.id).unwrap();

        journal
            .update(
                entry.id,
                JournalEntryUpdate {
                    lines: Some(vec![
                        JournalLine::debit("1101", dec!(600)),
                        JournalLine::credit("4001", dec!(600)),
                    ]),
                    ..JournalEntryUpdate::default()
                },
            )
            .unwrap();

        // Balances reflect only the new amount, with no residue of the old.
        assert_eq!(balance(&ledger, "1101"), dec!(600));
        assert_eq!(balance(&ledger, "4001"), dec!(600));
    }

    #[test]
    fn test_posted_delete_reverses_balances() {
        let (ledger, company_id) = setup(true);
        let journal = ledger.journal();

        let entry = journal.create(simple_entry(company_id, dec!(1000))).unwrap();
        journal.post(entry.id).unwrap();
        journal.delete(entry.id).unwrap();

        assert_eq!(balance(&ledger, "1101"), dec!(0));
        assert_eq!(balance(&ledger, "4001"), dec!(0));
        assert!(matches!(
            journal.get(entry.id),
            Err(LedgerError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_entry_numbers_are_never_reused() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let first = journal.create(simple_entry(company_id, dec!(100))).unwrap();
        journal.delete(first.id).unwrap();
        let second = journal.create(simple_entry(company_id, dec!(100))).unwrap();

        assert_eq!(first.entry_number.value(), 1);
        assert_eq!(second.entry_number.value(), 2);
    }

    #[test]
    fn test_closing_entries_are_immutable() {
        let (ledger, company_id) = setup(true);
        let journal = ledger.journal();

        let entry = {
            let mut state = ledger.write();
            state
                .create_posted_entry(
                    NewJournalEntry {
                        company_id,
                        date: day(30),
                        description: "Closing entries".to_string(),
                        lines: vec![
                            JournalLine::debit("4001", dec!(100)),
                            JournalLine::credit("5001", dec!(100)),
                        ],
                    },
                    EntrySource::Closing,
                )
                .unwrap()
        };

        assert!(matches!(
            journal.update(entry.id, JournalEntryUpdate::default()),
            Err(LedgerError::ClosingEntryImmutable(_))
        ));
        assert!(matches!(
            journal.delete(entry.id),
            Err(LedgerError::ClosingEntryImmutable(_))
        ));
    }

    #[test]
    fn test_closed_period_blocks_create_and_post() {
        let (ledger, company_id) = setup(true);
        let journal = ledger.journal();

        let stuck = journal.create(simple_entry(company_id, dec!(100))).unwrap();
        {
            let mut state = ledger.write();
            state.company_mut(company_id).unwrap().last_closing_date = Some(day(20));
        }

        assert!(matches!(
            journal.create(simple_entry(company_id, dec!(50))),
            Err(LedgerError::PeriodClosed { .. })
        ));
        assert!(matches!(
            journal.post(stuck.id),
            Err(LedgerError::PeriodClosed { .. })
        ));

        // The draft can still be moved onto an open date and posted there,
        // or deleted outright.
        journal
            .update(
                stuck.id,
                JournalEntryUpdate {
                    date: Some(day(25)),
                    ..JournalEntryUpdate::default()
                },
            )
            .unwrap();
        journal.post(stuck.id).unwrap();
        assert_eq!(balance(&ledger, "1101"), dec!(100));
    }

    #[test]
    fn test_closed_period_blocks_posted_edits_despite_policy() {
        let (ledger, company_id) = setup(true);
        let journal = ledger.journal();

        let entry = journal.create(simple_entry(company_id, dec!(1000))).unwrap();
        journal.post(entry.id).unwrap();
        {
            let mut state = ledger.write();
            state.company_mut(company_id).unwrap().last_closing_date = Some(day(20));
        }

        assert!(matches!(
            journal.update(
                entry.id,
                JournalEntryUpdate {
                    description: Some("restated".to_string()),
                    ..JournalEntryUpdate::default()
                }
            ),
            Err(LedgerError::PeriodClosed { .. })
        ));
        assert!(matches!(
            journal.delete(entry.id),
            Err(LedgerError::PeriodClosed { .. })
        ));
    }

    #[test]
    fn test_list_unposted_in_number_order() {
        let (ledger, company_id) = setup(false);
        let journal = ledger.journal();

        let first = journal.create(simple_entry(company_id, dec!(10))).unwrap();
        let second = journal.create(simple_entry(company_id, dec!(20))).unwrap();
        let third = journal.create(simple_entry(company_id, dec!(30))).unwrap();
        journal.post(second.id).unwrap();

        let drafts = journal.list_unposted(company_id).unwrap();
        let ids: Vec<_> = drafts.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
    }
}

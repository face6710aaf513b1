//! Property tests for balance projection.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use saldo_shared::types::{AccountCode, CompanyId};

use crate::accounts::types::{AccountType, NewAccount};
use crate::journal::entry::{JournalEntryUpdate, JournalLine, NewJournalEntry};
use crate::state::Ledger;

const CHART: [(&str, AccountType); 5] = [
    ("1000", AccountType::Asset),
    ("2000", AccountType::Liability),
    ("3000", AccountType::Equity),
    ("4000", AccountType::Revenue),
    ("5000", AccountType::Expense),
];

fn setup() -> (Ledger, CompanyId) {
    let ledger = Ledger::new();
    let company = ledger.companies().register("Propco", "USD");
    ledger
        .companies()
        .set_allow_edit_posted(company.id, true)
        .unwrap();
    for (code, account_type) in CHART {
        ledger
            .accounts()
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

fn balances(ledger: &Ledger) -> Vec<Decimal> {
    CHART
        .iter()
        .map(|(code, _)| {
            ledger
                .accounts()
                .get(&AccountCode::from(*code))
                .unwrap()
                .balance
        })
        .collect()
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A balanced two-line entry across any two chart accounts.
fn entry_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    (0usize..CHART.len(), 0usize..CHART.len(), amount()).prop_map(
        |(debit, credit, amount)| {
            vec![
                JournalLine::debit(CHART[debit].0, amount),
                JournalLine::credit(CHART[credit].0, amount),
            ]
        },
    )
}

fn entry_batches() -> impl Strategy<Value = Vec<Vec<JournalLine>>> {
    prop::collection::vec(entry_lines(), 1..20)
}

fn post_all(ledger: &Ledger, company_id: CompanyId, batches: &[Vec<JournalLine>]) {
    let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    for lines in batches {
        let entry = ledger
            .journal()
            .create(NewJournalEntry {
                company_id,
                date,
                description: "movement".to_string(),
                lines: lines.clone(),
            })
            .unwrap();
        ledger.journal().post(entry.id).unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any sequence of posted entries, full recomputation SHALL land
    /// on exactly the balances incremental posting produced.
    #[test]
    fn prop_recalculation_matches_incremental(batches in entry_batches()) {
        let (ledger, company_id) = setup();
        post_all(&ledger, company_id, &batches);

        let incremental = balances(&ledger);
        let summary = ledger.balances().recalculate(company_id).unwrap();

        prop_assert_eq!(summary.entries_replayed, batches.len());
        prop_assert_eq!(balances(&ledger), incremental);
    }

    /// For any mix of posted and draft entries, recomputation SHALL replay
    /// only the posted ones, and drafts SHALL never move a balance.
    #[test]
    fn prop_drafts_never_affect_balances(
        posted in entry_batches(),
        drafts in entry_batches(),
    ) {
        let (ledger, company_id) = setup();
        post_all(&ledger, company_id, &posted);
        let date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        for lines in &drafts {
            ledger
                .journal()
                .create(NewJournalEntry {
                    company_id,
                    date,
                    description: "draft".to_string(),
                    lines: lines.clone(),
                })
                .unwrap();
        }

        let before = balances(&ledger);
        let summary = ledger.balances().recalculate(company_id).unwrap();

        prop_assert_eq!(summary.entries_replayed, posted.len());
        prop_assert_eq!(balances(&ledger), before);
    }

    /// For any sequence of entries posted and then deleted again, every
    /// balance SHALL return to zero.
    #[test]
    fn prop_deleting_everything_returns_to_zero(batches in entry_batches()) {
        let (ledger, company_id) = setup();
        post_all(&ledger, company_id, &batches);

        let posted: Vec<_> = {
            let state = ledger.read();
            state
                .entries
                .values()
                .filter(|entry| entry.company_id == company_id)
                .map(|entry| entry.id)
                .collect()
        };
        for id in posted {
            ledger.journal().delete(id).unwrap();
        }

        for balance in balances(&ledger) {
            prop_assert_eq!(balance, Decimal::ZERO);
        }
    }

    /// For any posted entry and any replacement lines, editing in place
    /// SHALL leave the same balances as posting the replacement fresh.
    #[test]
    fn prop_edit_equals_fresh_posting(
        original in entry_lines(),
        replacement in entry_lines(),
    ) {
        let (edited, company_a) = setup();
        let entry = edited
            .journal()
            .create(NewJournalEntry {
                company_id: company_a,
                date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                description: "original".to_string(),
                lines: original,
            })
            .unwrap();
        edited.journal().post(entry.id).unwrap();
        edited
            .journal()
            .update(
                entry.id,
                JournalEntryUpdate {
                    lines: Some(replacement.clone()),
                    ..JournalEntryUpdate::default()
                },
            )
            .unwrap();

        let (fresh, company_b) = setup();
        post_all(&fresh, company_b, &[replacement]);

        prop_assert_eq!(balances(&edited), balances(&fresh));
    }
}

//! Property-based tests for journal line validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::JournalLine;
use super::validation::{line_totals, normalize_lines, validate_lines};
use crate::error::LedgerError;

/// Strategy for positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for account codes drawn from a small realistic chart.
fn account_code() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("1101"),
        Just("1102"),
        Just("2101"),
        Just("4001"),
        Just("5001"),
    ]
}

/// Strategy for a balanced line set: N debit/credit pairs of equal amounts.
fn balanced_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec((account_code(), account_code(), positive_amount()), 1..6).prop_map(
        |pairs| {
            let mut lines = Vec::with_capacity(pairs.len() * 2);
            for (debit_account, credit_account, amount) in pairs {
                lines.push(JournalLine::debit(debit_account, amount));
                lines.push(JournalLine::credit(credit_account, amount));
            }
            lines
        },
    )
}

/// Strategy for a mix of effective and blank rows.
fn lines_with_blanks() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec(
        (account_code(), prop_oneof![Just(true), Just(false)], positive_amount()),
        0..8,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(account, blank, amount)| {
                if blank {
                    JournalLine::debit(account, Decimal::ZERO)
                } else {
                    JournalLine::debit(account, amount)
                }
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of equal debit/credit pairs, validation SHALL succeed.
    #[test]
    fn prop_balanced_entries_accepted(lines in balanced_lines()) {
        prop_assert!(validate_lines(&lines).is_ok());
    }

    /// *For any* balanced line set, skewing one debit line by a nonzero
    /// amount SHALL be rejected as unbalanced.
    #[test]
    fn prop_skewed_entries_rejected(
        lines in balanced_lines(),
        skew in positive_amount(),
    ) {
        let mut lines = lines;
        lines[0].debit += skew;

        prop_assert!(
            matches!(
                validate_lines(&lines),
                Err(LedgerError::UnbalancedEntry { .. })
            ),
            "expected Err(LedgerError::UnbalancedEntry)"
        );
    }

    /// *For any* line set, normalization SHALL preserve the debit and credit
    /// totals (blank rows contribute nothing).
    #[test]
    fn prop_normalize_preserves_totals(lines in lines_with_blanks()) {
        let before = line_totals(&lines);
        let after = line_totals(&normalize_lines(lines));
        prop_assert_eq!(before, after);
    }

    /// *For any* line set, normalization SHALL leave no blank rows behind.
    #[test]
    fn prop_normalize_removes_all_blanks(lines in lines_with_blanks()) {
        let normalized = normalize_lines(lines);
        prop_assert!(normalized.iter().all(|l| !l.is_blank()));
    }

    /// *For any* balanced line set, validation SHALL be insensitive to blank
    /// rows once normalization has run.
    #[test]
    fn prop_blanks_do_not_affect_validation(lines in balanced_lines()) {
        let mut with_blanks = lines.clone();
        with_blanks.push(JournalLine::debit("1101", Decimal::ZERO));
        with_blanks.push(JournalLine::credit("4001", Decimal::ZERO));

        let direct = validate_lines(&lines).is_ok();
        let via_normalize = validate_lines(&normalize_lines(with_blanks)).is_ok();
        prop_assert_eq!(direct, via_normalize);
    }
}

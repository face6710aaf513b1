//! Line normalization and balance validation for journal entries.

use rust_decimal::Decimal;

use super::entry::JournalLine;
use crate::error::LedgerError;

/// Drops blank rows (both sides zero) from a line set.
///
/// Blank rows are incomplete drafts from entry forms; they are filtered out
/// before anything is validated or saved.
#[must_use]
pub fn normalize_lines(lines: Vec<JournalLine>) -> Vec<JournalLine> {
    lines.into_iter().filter(|l| !l.is_blank()).collect()
}

/// Sums the debit and credit sides of a line set.
#[must_use]
pub fn line_totals(lines: &[JournalLine]) -> (Decimal, Decimal) {
    let debit = lines.iter().map(|l| l.debit).sum();
    let credit = lines.iter().map(|l| l.credit).sum();
    (debit, credit)
}

/// Validates that a line set forms a well-formed, balanced entry.
///
/// Rules:
/// - at least one effective line
/// - no negative amounts
/// - each line is single-sided (debit or credit, not both)
/// - total debits equal total credits, and the common total is positive
///
/// # Errors
///
/// Returns an error naming the first violated rule.
pub fn validate_lines(lines: &[JournalLine]) -> Result<(), LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::EmptyEntry);
    }

    for line in lines {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount {
                account: line.account.clone(),
            });
        }
        if line.debit > Decimal::ZERO && line.credit > Decimal::ZERO {
            return Err(LedgerError::BothSidesSet {
                account: line.account.clone(),
            });
        }
    }

    let (debit, credit) = line_totals(lines);
    if debit != credit {
        return Err(LedgerError::UnbalancedEntry { debit, credit });
    }
    if debit == Decimal::ZERO {
        // Equal totals of zero means every row was blank.
        return Err(LedgerError::EmptyEntry);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balanced_lines_accepted() {
        let lines = vec![
            JournalLine::debit("1101", dec!(100.00)),
            JournalLine::credit("4001", dec!(100.00)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_multi_line_balanced_accepted() {
        let lines = vec![
            JournalLine::debit("1101", dec!(115.00)),
            JournalLine::credit("4001", dec!(100.00)),
            JournalLine::credit("2201", dec!(15.00)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_unbalanced_rejected() {
        let lines = vec![
            JournalLine::debit("1101", dec!(100.00)),
            JournalLine::credit("4001", dec!(60.00)),
        ];
        let err = validate_lines(&lines).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::UnbalancedEntry {
                debit,
                credit,
            } if debit == dec!(100.00) && credit == dec!(60.00)
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            validate_lines(&[]),
            Err(LedgerError::EmptyEntry)
        ));
    }

    #[test]
    fn test_all_blank_rejected() {
        let lines = vec![
            JournalLine::debit("1101", dec!(0)),
            JournalLine::credit("4001", dec!(0)),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::EmptyEntry)
        ));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let lines = vec![
            JournalLine::debit("1101", dec!(-5.00)),
            JournalLine::credit("4001", dec!(-5.00)),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_both_sides_rejected() {
        let both = JournalLine {
            account: "1101".into(),
            debit: dec!(10.00),
            credit: dec!(10.00),
            memo: None,
        };
        let lines = vec![both, JournalLine::credit("4001", dec!(0))];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::BothSidesSet { .. })
        ));
    }

    #[test]
    fn test_normalize_drops_blank_rows() {
        let lines = vec![
            JournalLine::debit("1101", dec!(100.00)),
            JournalLine::debit("1102", dec!(0)),
            JournalLine::credit("4001", dec!(100.00)),
            JournalLine::credit("4002", dec!(0)),
        ];
        let normalized = normalize_lines(lines);
        assert_eq!(normalized.len(), 2);
        assert!(normalized.iter().all(|l| !l.is_blank()));
    }

    #[test]
    fn test_line_totals() {
        let lines = vec![
            JournalLine::debit("1101", dec!(70.00)),
            JournalLine::debit("1102", dec!(30.00)),
            JournalLine::credit("4001", dec!(100.00)),
        ];
        assert_eq!(line_totals(&lines), (dec!(100.00), dec!(100.00)));
    }
}

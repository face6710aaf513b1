//! Property-based tests for the debit/credit sign convention.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{AccountType, NormalBalance};

/// Strategy for non-negative amounts (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy over all five account types.
fn account_type() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Revenue),
        Just(AccountType::Expense),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* debit/credit pair, the two normal sides see changes of equal
    /// magnitude and opposite sign.
    #[test]
    fn prop_normal_sides_are_antisymmetric(debit in amount(), credit in amount()) {
        let on_debit_normal = NormalBalance::Debit.balance_change(debit, credit);
        let on_credit_normal = NormalBalance::Credit.balance_change(debit, credit);
        prop_assert_eq!(on_debit_normal, -on_credit_normal);
    }

    /// *For any* amount, swapping the debit and credit sides negates the
    /// change.
    #[test]
    fn prop_swapping_sides_negates_change(
        debit in amount(),
        credit in amount(),
        account_type in account_type(),
    ) {
        let forward = account_type.balance_change(debit, credit);
        let swapped = account_type.balance_change(credit, debit);
        prop_assert_eq!(forward, -swapped);
    }

    /// *For any* amount, debiting a debit-normal account and crediting a
    /// credit-normal account by the same amount increase both balances
    /// identically. This is why a balanced sale raises receivables and
    /// revenue by the same figure.
    #[test]
    fn prop_balanced_pair_raises_both_sides_equally(x in amount()) {
        let asset_gain = AccountType::Asset.balance_change(x, Decimal::ZERO);
        let revenue_gain = AccountType::Revenue.balance_change(Decimal::ZERO, x);
        prop_assert_eq!(asset_gain, x);
        prop_assert_eq!(revenue_gain, x);
    }

    /// *For any* account type, a zero debit/credit pair changes nothing.
    #[test]
    fn prop_zero_pair_changes_nothing(account_type in account_type()) {
        prop_assert_eq!(
            account_type.balance_change(Decimal::ZERO, Decimal::ZERO),
            Decimal::ZERO
        );
    }

    /// *For any* two debit/credit pairs, applying them together equals
    /// applying them one after the other. Incremental balance updates rely
    /// on this linearity.
    #[test]
    fn prop_balance_change_is_linear(
        d1 in amount(),
        c1 in amount(),
        d2 in amount(),
        c2 in amount(),
        account_type in account_type(),
    ) {
        let combined = account_type.balance_change(d1 + d2, c1 + c2);
        let separate =
            account_type.balance_change(d1, c1) + account_type.balance_change(d2, c2);
        prop_assert_eq!(combined, separate);
    }
}

//! Account types and the debit/credit sign convention.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saldo_shared::types::{AccountCode, CompanyId};

/// The five account types of the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned by the company.
    Asset,
    /// Obligations owed to others.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned from operations.
    Revenue,
    /// Costs incurred in operations.
    Expense,
}

impl AccountType {
    /// Returns the side on which this account type carries its normal balance.
    ///
    /// - Asset, Expense: debit-normal
    /// - Liability, Equity, Revenue: credit-normal
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Calculates the signed balance change a debit/credit pair causes on an
    /// account of this type.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        self.normal_balance().balance_change(debit, credit)
    }

    /// Returns true for the temporary types (Revenue, Expense) that are
    /// zeroed into retained earnings when a period closes.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        };
        write!(f, "{name}")
    }
}

/// The side on which an account carries its normal balance.
///
/// This enum is the single home of the sign convention: every balance
/// mutation, recomputation, and report fold goes through
/// [`NormalBalance::balance_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense): balance += debit - credit.
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue): balance += credit - debit.
    Credit,
}

impl NormalBalance {
    /// Calculates the signed balance change for a debit/credit pair.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// An account in the chart of accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The account's code, its public identifier.
    pub code: AccountCode,
    /// Company this account belongs to.
    pub company_id: CompanyId,
    /// Human-readable account name.
    pub name: String,
    /// The account's type, fixed once the account has posted entries.
    pub account_type: AccountType,
    /// Parent account code, `None` for root accounts.
    pub parent: Option<AccountCode>,
    /// Materialized balance over all posted entries.
    pub balance: Decimal,
    /// Whether the account accepts new postings.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// The account code. Must be globally unique.
    pub code: AccountCode,
    /// Company the account belongs to.
    pub company_id: CompanyId,
    /// Human-readable account name.
    pub name: String,
    /// The account's type.
    pub account_type: AccountType,
    /// Optional parent account code.
    pub parent: Option<AccountCode>,
}

/// How an update changes an account's parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParentChange {
    /// Leave the parent as it is.
    #[default]
    Unchanged,
    /// Detach the account, making it a root.
    MakeRoot,
    /// Re-parent the account under the given code.
    MoveUnder(AccountCode),
}

/// Input for updating an account. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    /// New account name.
    pub name: Option<String>,
    /// New account type. Rejected once the account has posted entries.
    pub account_type: Option<AccountType>,
    /// How to change the parent.
    pub parent: ParentChange,
}

/// An account annotated with its depth in the hierarchy listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountNode {
    /// The account.
    pub account: Account,
    /// Depth in the tree: 0 for roots, parent depth + 1 otherwise.
    pub depth: usize,
}

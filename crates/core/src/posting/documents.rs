//! Business documents and the default-account map.
//!
//! Documents are registered with the engine first, which allocates their id
//! and tracks posting state. The payload types here ([`SaleDocument`],
//! [`PurchaseDocument`], [`SalesReturnDocument`]) carry the figures the
//! coordinator turns into journal lines; the company and posting state live
//! on the registered [`DocumentRecord`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saldo_shared::types::{AccountCode, CompanyId, DocumentId, JournalEntryId};

use crate::error::LedgerError;

// ========== Document Records ==========

/// The kind of business document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Sales invoice.
    Sale,
    /// Purchase invoice.
    Purchase,
    /// Sales return (credit note).
    SalesReturn,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sale => write!(f, "sale"),
            Self::Purchase => write!(f, "purchase"),
            Self::SalesReturn => write!(f, "sales return"),
        }
    }
}

/// A document known to the engine, posted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique identifier, allocated at registration.
    pub id: DocumentId,
    /// Company the document belongs to.
    pub company_id: CompanyId,
    /// Document kind.
    pub kind: DocumentKind,
    /// Document date.
    pub date: NaiveDate,
    /// Whether the document has been posted to the ledger.
    pub posted: bool,
    /// The journal entry created by posting, if posted.
    pub journal_entry_id: Option<JournalEntryId>,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

// ========== Default Accounts ==========

/// The role an account plays in automatic document posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAccountKind {
    /// Trade receivables, debited on credit sales.
    AccountsReceivable,
    /// Trade payables, credited on credit purchases.
    AccountsPayable,
    /// Sales revenue.
    Sales,
    /// Cost of goods sold.
    CostOfGoodsSold,
    /// Inventory asset.
    Inventory,
    /// Contra-revenue account for sales returns.
    SalesReturns,
    /// VAT collected on sales, owed to the tax authority.
    VatPayable,
    /// VAT paid on purchases, reclaimable from the tax authority.
    VatReceivable,
    /// Equity account closing entries roll profit into.
    RetainedEarnings,
}

impl std::fmt::Display for DefaultAccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountsReceivable => write!(f, "accounts receivable"),
            Self::AccountsPayable => write!(f, "accounts payable"),
            Self::Sales => write!(f, "sales"),
            Self::CostOfGoodsSold => write!(f, "cost of goods sold"),
            Self::Inventory => write!(f, "inventory"),
            Self::SalesReturns => write!(f, "sales returns"),
            Self::VatPayable => write!(f, "VAT payable"),
            Self::VatReceivable => write!(f, "VAT receivable"),
            Self::RetainedEarnings => write!(f, "retained earnings"),
        }
    }
}

/// Maps posting roles to accounts in the chart.
///
/// Every slot is optional; posting an operation that needs an unset slot
/// fails with [`LedgerError::MissingDefaultAccount`] before any state
/// changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultAccounts {
    /// Trade receivables account.
    pub accounts_receivable: Option<AccountCode>,
    /// Trade payables account.
    pub accounts_payable: Option<AccountCode>,
    /// Sales revenue account.
    pub sales: Option<AccountCode>,
    /// Cost of goods sold account.
    pub cost_of_goods_sold: Option<AccountCode>,
    /// Inventory account.
    pub inventory: Option<AccountCode>,
    /// Sales returns account.
    pub sales_returns: Option<AccountCode>,
    /// VAT payable account.
    pub vat_payable: Option<AccountCode>,
    /// VAT receivable account.
    pub vat_receivable: Option<AccountCode>,
    /// Retained earnings account.
    pub retained_earnings: Option<AccountCode>,
}

impl DefaultAccounts {
    /// Returns the account mapped for `kind`, or
    /// [`LedgerError::MissingDefaultAccount`].
    pub fn require(&self, kind: DefaultAccountKind) -> Result<&AccountCode, LedgerError> {
        self.slot(kind)
            .as_ref()
            .ok_or(LedgerError::MissingDefaultAccount(kind))
    }

    const fn slot(&self, kind: DefaultAccountKind) -> &Option<AccountCode> {
        match kind {
            DefaultAccountKind::AccountsReceivable => &self.accounts_receivable,
            DefaultAccountKind::AccountsPayable => &self.accounts_payable,
            DefaultAccountKind::Sales => &self.sales,
            DefaultAccountKind::CostOfGoodsSold => &self.cost_of_goods_sold,
            DefaultAccountKind::Inventory => &self.inventory,
            DefaultAccountKind::SalesReturns => &self.sales_returns,
            DefaultAccountKind::VatPayable => &self.vat_payable,
            DefaultAccountKind::VatReceivable => &self.vat_receivable,
            DefaultAccountKind::RetainedEarnings => &self.retained_earnings,
        }
    }
}

// ========== Document Payloads ==========

/// How a document is settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// On credit, through the receivable/payable default account.
    #[default]
    OnAccount,
    /// Immediately, through the given cash or bank account.
    Cash(AccountCode),
}

/// A line item on a sale or sales return, carrying the cost basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Quantity sold or returned.
    pub quantity: Decimal,
    /// Moving average cost per unit, when stock history exists.
    pub average_cost: Option<Decimal>,
    /// Last purchase price per unit, the fallback cost basis.
    pub purchase_price: Decimal,
}

impl SaleItem {
    /// Cost basis per unit: average cost when known and positive,
    /// otherwise the purchase price.
    #[must_use]
    pub fn unit_cost(&self) -> Decimal {
        self.average_cost
            .filter(|cost| *cost > Decimal::ZERO)
            .unwrap_or(self.purchase_price)
    }
}

/// A sales invoice ready to post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDocument {
    /// Registered document id.
    pub id: DocumentId,
    /// Invoice date.
    pub date: NaiveDate,
    /// Gross total in the document currency, VAT inclusive.
    pub total: Decimal,
    /// Document currency code.
    pub currency: String,
    /// Exchange rate from document currency to the company base currency.
    pub exchange_rate: Decimal,
    /// Items sold, for the cost-of-goods-sold leg.
    pub items: Vec<SaleItem>,
    /// Settlement terms.
    pub settlement: Settlement,
}

/// A purchase invoice ready to post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDocument {
    /// Registered document id.
    pub id: DocumentId,
    /// Invoice date.
    pub date: NaiveDate,
    /// Gross total in the document currency, VAT inclusive.
    pub total: Decimal,
    /// Document currency code.
    pub currency: String,
    /// Exchange rate from document currency to the company base currency.
    pub exchange_rate: Decimal,
    /// Settlement terms.
    pub settlement: Settlement,
}

/// A sales return (credit note) ready to post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReturnDocument {
    /// Registered document id.
    pub id: DocumentId,
    /// Return date.
    pub date: NaiveDate,
    /// Gross total returned in the document currency, VAT inclusive.
    pub total: Decimal,
    /// Document currency code.
    pub currency: String,
    /// Exchange rate from document currency to the company base currency.
    pub exchange_rate: Decimal,
    /// Items returned, for the inventory restocking leg.
    pub items: Vec<SaleItem>,
    /// Settlement terms.
    pub settlement: Settlement,
}

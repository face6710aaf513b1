//! Turns business documents into balanced, posted journal entries.
//!
//! Each flow works the same way: gate on the registered document record,
//! resolve the exchange rate, split VAT out of the gross total, assemble
//! the lines from the default-account map, then create the posted entry
//! and stamp the record in one state mutation. A failure anywhere leaves
//! the document unposted and the ledger untouched.

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;

use saldo_shared::types::{AccountCode, CompanyId, DocumentId, JournalEntryId};

use crate::company::VatPolicy;
use crate::currency;
use crate::error::LedgerError;
use crate::journal::entry::{EntrySource, JournalEntry, JournalLine, NewJournalEntry};
use crate::posting::documents::{
    DefaultAccountKind, DefaultAccounts, DocumentKind, DocumentRecord, PurchaseDocument,
    SaleDocument, SaleItem, SalesReturnDocument, Settlement,
};
use crate::state::{Ledger, LedgerState};

/// A posted document: the journal entry created for it and the stamped
/// document record.
#[derive(Debug, Clone)]
pub struct PostingResult {
    /// The posted, balanced journal entry.
    pub entry: JournalEntry,
    /// The document record, now carrying the entry id.
    pub document: DocumentRecord,
}

/// Posts sales, purchases, and sales returns.
#[derive(Debug, Clone)]
pub struct PostingCoordinator {
    ledger: Ledger,
}

impl PostingCoordinator {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Registers a document with the engine, allocating its id. The
    /// document starts unposted and blocks period closing until posted or
    /// deregistered.
    pub fn register_document(
        &self,
        company_id: CompanyId,
        kind: DocumentKind,
        date: NaiveDate,
    ) -> Result<DocumentRecord, LedgerError> {
        let mut state = self.ledger.write();
        let company = state.company(company_id)?;
        state.ensure_period_open(company, date)?;
        let record = DocumentRecord {
            id: DocumentId::new(),
            company_id,
            kind,
            date,
            posted: false,
            journal_entry_id: None,
            registered_at: Utc::now(),
        };
        state.documents.insert(record.id, record.clone());
        info!(document_id = %record.id, kind = %kind, "Document registered");
        Ok(record)
    }

    /// Drops an unposted document. Posted documents cannot be dropped;
    /// delete their journal entry instead, which reverts the record to
    /// unposted.
    pub fn deregister_document(&self, id: DocumentId) -> Result<(), LedgerError> {
        let mut state = self.ledger.write();
        let record = state.document(id)?;
        if record.posted {
            return Err(LedgerError::AlreadyPosted(id));
        }
        state.documents.remove(&id);
        info!(document_id = %id, "Document deregistered");
        Ok(())
    }

    /// Fetches a document record by id.
    pub fn get_document(&self, id: DocumentId) -> Result<DocumentRecord, LedgerError> {
        self.ledger.read().document(id).cloned()
    }

    /// Posts a sales invoice.
    ///
    /// Debits the receivable (or cash) account with the gross total,
    /// credits sales with the net and VAT payable with the tax, and books
    /// cost of goods sold against inventory when the items carry cost.
    pub fn post_sale(
        &self,
        sale: &SaleDocument,
        defaults: &DefaultAccounts,
    ) -> Result<PostingResult, LedgerError> {
        let mut state = self.ledger.write();
        let result = post_sale_in(&mut state, sale, defaults)?;
        info!(
            document_id = %sale.id,
            entry_number = %result.entry.entry_number,
            "Sale posted"
        );
        Ok(result)
    }

    /// Posts a purchase invoice.
    ///
    /// Debits inventory with the net and VAT receivable with the tax, and
    /// credits the payable (or cash) account with the gross total.
    pub fn post_purchase(
        &self,
        purchase: &PurchaseDocument,
        defaults: &DefaultAccounts,
    ) -> Result<PostingResult, LedgerError> {
        let mut state = self.ledger.write();
        let result = post_purchase_in(&mut state, purchase, defaults)?;
        info!(
            document_id = %purchase.id,
            entry_number = %result.entry.entry_number,
            "Purchase posted"
        );
        Ok(result)
    }

    /// Posts a sales return.
    ///
    /// Mirrors a sale: debits sales returns with the net and VAT payable
    /// with the tax, credits the receivable (or cash) account with the
    /// gross refund, and moves the cost back from cost of goods sold into
    /// inventory.
    pub fn post_sales_return(
        &self,
        sales_return: &SalesReturnDocument,
        defaults: &DefaultAccounts,
    ) -> Result<PostingResult, LedgerError> {
        let mut state = self.ledger.write();
        let result = post_sales_return_in(&mut state, sales_return, defaults)?;
        info!(
            document_id = %sales_return.id,
            entry_number = %result.entry.entry_number,
            "Sales return posted"
        );
        Ok(result)
    }
}

/// Figures shared by all three posting flows, in base currency.
struct BaseFigures {
    gross: Decimal,
    net: Decimal,
    vat: Decimal,
    rate: Decimal,
}

fn base_figures(
    state: &LedgerState,
    record: &DocumentRecord,
    total: Decimal,
    doc_currency: &str,
    stored_rate: Decimal,
    date: NaiveDate,
) -> Result<BaseFigures, LedgerError> {
    let company = state.company(record.company_id)?;
    state.ensure_period_open(company, date)?;
    let decimal_places = state.config.posting.decimal_places;
    let rate = currency::resolve_rate(
        doc_currency,
        &company.settings.base_currency,
        stored_rate,
    )?;
    let gross = currency::convert(total, rate, decimal_places);
    if gross <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveTotal { total });
    }
    let (net, vat) = split_vat(gross, &company.settings.vat, decimal_places);
    Ok(BaseFigures {
        gross,
        net,
        vat,
        rate,
    })
}

/// Splits a VAT-inclusive gross into net and VAT by back-calculation:
/// net = gross / (1 + rate), VAT = gross - net. The VAT side absorbs the
/// rounding remainder, so the two always recombine into the gross exactly.
fn split_vat(gross: Decimal, vat: &VatPolicy, decimal_places: u32) -> (Decimal, Decimal) {
    if !vat.enabled || vat.rate <= Decimal::ZERO {
        return (gross, Decimal::ZERO);
    }
    let net = (gross / (Decimal::ONE + vat.rate))
        .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);
    (net, gross - net)
}

/// Total cost basis of the items, in the document currency.
fn items_cost(items: &[SaleItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.quantity * item.unit_cost())
        .sum()
}

fn settlement_account(
    settlement: &Settlement,
    defaults: &DefaultAccounts,
    on_account: DefaultAccountKind,
) -> Result<AccountCode, LedgerError> {
    match settlement {
        Settlement::OnAccount => defaults.require(on_account).cloned(),
        Settlement::Cash(code) => Ok(code.clone()),
    }
}

/// Fetches the record and gates it: right kind, not yet posted.
fn checked_record(
    state: &LedgerState,
    id: DocumentId,
    expected: DocumentKind,
) -> Result<DocumentRecord, LedgerError> {
    let record = state.document(id)?.clone();
    if record.kind != expected {
        return Err(LedgerError::DocumentKindMismatch {
            document: id,
            expected,
            actual: record.kind,
        });
    }
    if record.posted {
        return Err(LedgerError::AlreadyPosted(id));
    }
    Ok(record)
}

fn stamp_posted(
    state: &mut LedgerState,
    id: DocumentId,
    entry_id: JournalEntryId,
    date: NaiveDate,
) -> Result<DocumentRecord, LedgerError> {
    let record = state
        .documents
        .get_mut(&id)
        .ok_or(LedgerError::DocumentNotFound(id))?;
    record.posted = true;
    record.journal_entry_id = Some(entry_id);
    record.date = date;
    Ok(record.clone())
}

fn post_sale_in(
    state: &mut LedgerState,
    sale: &SaleDocument,
    defaults: &DefaultAccounts,
) -> Result<PostingResult, LedgerError> {
    let record = checked_record(state, sale.id, DocumentKind::Sale)?;
    let figures = base_figures(
        state,
        &record,
        sale.total,
        &sale.currency,
        sale.exchange_rate,
        sale.date,
    )?;
    let decimal_places = state.config.posting.decimal_places;
    let cost = currency::convert(items_cost(&sale.items), figures.rate, decimal_places);

    let receivable = settlement_account(
        &sale.settlement,
        defaults,
        DefaultAccountKind::AccountsReceivable,
    )?;
    let mut lines = vec![
        JournalLine::debit(receivable, figures.gross),
        JournalLine::credit(
            defaults.require(DefaultAccountKind::Sales)?.clone(),
            figures.net,
        ),
    ];
    if figures.vat > Decimal::ZERO {
        lines.push(JournalLine::credit(
            defaults.require(DefaultAccountKind::VatPayable)?.clone(),
            figures.vat,
        ));
    }
    if cost > Decimal::ZERO {
        lines.push(JournalLine::debit(
            defaults
                .require(DefaultAccountKind::CostOfGoodsSold)?
                .clone(),
            cost,
        ));
        lines.push(JournalLine::credit(
            defaults.require(DefaultAccountKind::Inventory)?.clone(),
            cost,
        ));
    }

    let entry = state.create_posted_entry(
        NewJournalEntry {
            company_id: record.company_id,
            date: sale.date,
            description: format!("Sale {}", sale.id),
            lines,
        },
        EntrySource::Document(sale.id),
    )?;
    let document = stamp_posted(state, sale.id, entry.id, sale.date)?;
    Ok(PostingResult { entry, document })
}

fn post_purchase_in(
    state: &mut LedgerState,
    purchase: &PurchaseDocument,
    defaults: &DefaultAccounts,
) -> Result<PostingResult, LedgerError> {
    let record = checked_record(state, purchase.id, DocumentKind::Purchase)?;
    let figures = base_figures(
        state,
        &record,
        purchase.total,
        &purchase.currency,
        purchase.exchange_rate,
        purchase.date,
    )?;

    let payable = settlement_account(
        &purchase.settlement,
        defaults,
        DefaultAccountKind::AccountsPayable,
    )?;
    let mut lines = vec![JournalLine::debit(
        defaults.require(DefaultAccountKind::Inventory)?.clone(),
        figures.net,
    )];
    if figures.vat > Decimal::ZERO {
        lines.push(JournalLine::debit(
            defaults.require(DefaultAccountKind::VatReceivable)?.clone(),
            figures.vat,
        ));
    }
    lines.push(JournalLine::credit(payable, figures.gross));

    let entry = state.create_posted_entry(
        NewJournalEntry {
            company_id: record.company_id,
            date: purchase.date,
            description: format!("Purchase {}", purchase.id),
            lines,
        },
        EntrySource::Document(purchase.id),
    )?;
    let document = stamp_posted(state, purchase.id, entry.id, purchase.date)?;
    Ok(PostingResult { entry, document })
}

fn post_sales_return_in(
    state: &mut LedgerState,
    sales_return: &SalesReturnDocument,
    defaults: &DefaultAccounts,
) -> Result<PostingResult, LedgerError> {
    let record = checked_record(state, sales_return.id, DocumentKind::SalesReturn)?;
    let figures = base_figures(
        state,
        &record,
        sales_return.total,
        &sales_return.currency,
        sales_return.exchange_rate,
        sales_return.date,
    )?;
    let decimal_places = state.config.posting.decimal_places;
    let cost = currency::convert(
        items_cost(&sales_return.items),
        figures.rate,
        decimal_places,
    );

    let receivable = settlement_account(
        &sales_return.settlement,
        defaults,
        DefaultAccountKind::AccountsReceivable,
    )?;
    let mut lines = vec![JournalLine::debit(
        defaults.require(DefaultAccountKind::SalesReturns)?.clone(),
        figures.net,
    )];
    if figures.vat > Decimal::ZERO {
        lines.push(JournalLine::debit(
            defaults.require(DefaultAccountKind::VatPayable)?.clone(),
            figures.vat,
        ));
    }
    lines.push(JournalLine::credit(receivable, figures.gross));
    if cost > Decimal::ZERO {
        lines.push(JournalLine::debit(
            defaults.require(DefaultAccountKind::Inventory)?.clone(),
            cost,
        ));
        lines.push(JournalLine::credit(
            defaults
                .require(DefaultAccountKind::CostOfGoodsSold)?
                .clone(),
            cost,
        ));
    }

    let entry = state.create_posted_entry(
        NewJournalEntry {
            company_id: record.company_id,
            date: sales_return.date,
            description: format!("Sales return {}", sales_return.id),
            lines,
        },
        EntrySource::Document(sales_return.id),
    )?;
    let document = stamp_posted(state, sales_return.id, entry.id, sales_return.date)?;
    Ok(PostingResult { entry, document })
}

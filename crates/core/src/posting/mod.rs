//! Document posting: document records, the default-account map, and the
//! coordinator that turns documents into journal entries.

pub mod coordinator;
pub mod documents;

pub use coordinator::{PostingCoordinator, PostingResult};
pub use documents::{
    DefaultAccountKind, DefaultAccounts, DocumentKind, DocumentRecord, PurchaseDocument,
    SaleDocument, SaleItem, SalesReturnDocument, Settlement,
};

//! Journal entries: line validation, the entry model, and the store.

pub mod entry;
pub mod store;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use entry::{
    EntryNumber, EntrySource, JournalEntry, JournalEntryUpdate, JournalLine, NewJournalEntry,
};
pub use store::JournalStore;

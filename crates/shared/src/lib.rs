//! Shared types and configuration for Saldo.
//!
//! This crate provides the common vocabulary used across the engine:
//! - Typed IDs for type-safe entity references
//! - Account codes (the sortable public identifier of ledger accounts)
//! - Engine configuration management

pub mod config;
pub mod types;

pub use config::EngineConfig;
pub use types::{AccountCode, CompanyId, DocumentId, JournalEntryId};

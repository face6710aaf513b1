//! Core ledger and posting engine for Saldo.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All state lives in one in-memory store behind the
//! [`Ledger`] handle; every component obtained from the same handle sees
//! the same companies, accounts, entries, and documents.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts and the balance sign convention
//! - `journal` - Journal entries, line validation, and the store
//! - `balance` - Incremental balance projection and full replay
//! - `posting` - Document posting through the default-account map
//! - `closing` - Period closing and closing-entry generation
//! - `reports` - Account ledger and trial balance queries
//! - `company` - Companies and their posting policy
//! - `currency` - Conversion into the company base currency

pub mod accounts;
pub mod balance;
pub mod closing;
pub mod company;
pub mod currency;
pub mod error;
pub mod journal;
pub mod posting;
pub mod reports;
mod state;

pub use error::LedgerError;
pub use state::Ledger;

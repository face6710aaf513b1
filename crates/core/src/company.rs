//! Companies and their posting policy.
//!
//! A company scopes entry numbering, the closing date, and the policy knobs
//! the engine consults on every mutation: whether posted entries may be
//! edited, and how VAT is split out of document totals.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use saldo_shared::types::CompanyId;

use crate::error::LedgerError;
use crate::state::Ledger;

/// How VAT is split out of gross document totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatPolicy {
    /// Whether documents carry VAT at all.
    pub enabled: bool,
    /// VAT rate as a fraction (0.15 = 15%). Ignored when disabled.
    pub rate: Decimal,
}

impl VatPolicy {
    /// A policy that never splits VAT.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            rate: Decimal::ZERO,
        }
    }
}

/// Per-company policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySettings {
    /// ISO currency code all balances are kept in. Fixed at registration.
    pub base_currency: String,
    /// VAT policy applied when posting documents.
    pub vat: VatPolicy,
    /// Whether posted journal entries may be edited or deleted.
    pub allow_edit_posted: bool,
}

/// A company: the unit of scoping for accounts, entries, and closing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier.
    pub id: CompanyId,
    /// Company name.
    pub name: String,
    /// Policy settings.
    pub settings: CompanySettings,
    /// Latest date through which the books are closed, if any.
    pub last_closing_date: Option<NaiveDate>,
    /// Next value of the company-scoped entry number sequence.
    pub(crate) next_entry_number: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Registry of companies and their settings.
#[derive(Debug, Clone)]
pub struct CompanyRegistry {
    ledger: Ledger,
}

impl CompanyRegistry {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Registers a company with policy defaults from the engine config.
    pub fn register(&self, name: &str, base_currency: &str) -> Company {
        let mut state = self.ledger.write();
        let defaults = &state.config.company_defaults;
        let settings = CompanySettings {
            base_currency: base_currency.to_string(),
            vat: VatPolicy {
                enabled: defaults.vat_enabled,
                rate: defaults.vat_rate,
            },
            allow_edit_posted: defaults.allow_edit_posted,
        };
        let company = Self::build(name, settings);
        state.companies.insert(company.id, company.clone());
        info!(company_id = %company.id, name = %company.name, "Company registered");
        company
    }

    /// Registers a company with explicit settings.
    pub fn register_with_settings(&self, name: &str, settings: CompanySettings) -> Company {
        let mut state = self.ledger.write();
        let company = Self::build(name, settings);
        state.companies.insert(company.id, company.clone());
        info!(company_id = %company.id, name = %company.name, "Company registered");
        company
    }

    /// Fetches a company by id.
    pub fn get(&self, company_id: CompanyId) -> Result<Company, LedgerError> {
        self.ledger.read().company(company_id).cloned()
    }

    /// Toggles whether posted entries may be edited or deleted.
    pub fn set_allow_edit_posted(
        &self,
        company_id: CompanyId,
        allow: bool,
    ) -> Result<Company, LedgerError> {
        let mut state = self.ledger.write();
        let company = state.company_mut(company_id)?;
        company.settings.allow_edit_posted = allow;
        company.updated_at = Utc::now();
        let company = company.clone();
        debug!(company_id = %company_id, allow, "Posted-entry editing policy changed");
        Ok(company)
    }

    /// Replaces the company's VAT policy.
    pub fn set_vat_policy(
        &self,
        company_id: CompanyId,
        vat: VatPolicy,
    ) -> Result<Company, LedgerError> {
        let mut state = self.ledger.write();
        let company = state.company_mut(company_id)?;
        company.settings.vat = vat;
        company.updated_at = Utc::now();
        let company = company.clone();
        debug!(company_id = %company_id, "VAT policy changed");
        Ok(company)
    }

    fn build(name: &str, settings: CompanySettings) -> Company {
        let now = Utc::now();
        Company {
            id: CompanyId::new(),
            name: name.to_string(),
            settings,
            last_closing_date: None,
            next_entry_number: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

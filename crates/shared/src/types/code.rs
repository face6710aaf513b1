//! Account codes: the sortable public identifiers of ledger accounts.

use serde::{Deserialize, Serialize};

/// The public identifier of a ledger account, e.g. `"1101"`.
///
/// Codes order lexically; chart-of-accounts listings rely on this to keep
/// sibling accounts in a stable, predictable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountCode(String);

impl AccountCode {
    /// Creates an account code from any string-like value.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for AccountCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for AccountCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for AccountCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Conversion of document amounts into the company base currency.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::LedgerError;

/// Converts `amount` at `exchange_rate`, rounded to `decimal_places` using
/// banker's rounding (round half to even).
#[must_use]
pub fn convert(amount: Decimal, exchange_rate: Decimal, decimal_places: u32) -> Decimal {
    (amount * exchange_rate)
        .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

/// Resolves the effective exchange rate for a document.
///
/// A document already in the base currency always converts at 1, whatever
/// rate it carries. Foreign-currency documents must carry a positive rate.
pub(crate) fn resolve_rate(
    document_currency: &str,
    base_currency: &str,
    stored_rate: Decimal,
) -> Result<Decimal, LedgerError> {
    if document_currency == base_currency {
        return Ok(Decimal::ONE);
    }
    if stored_rate <= Decimal::ZERO {
        return Err(LedgerError::InvalidExchangeRate { rate: stored_rate });
    }
    Ok(stored_rate)
}

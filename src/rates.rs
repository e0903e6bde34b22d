//! Exchange-rate table and currency conversion.
//!
//! The table maps `"{FROM}_{TO}"` keys to multiplicative factors. Conversion
//! only ever reads the direct pair: the supplier of the table is responsible
//! for populating both directions (see [`ExchangeRates::from_quotes`]).

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Currency;
use crate::types::ZakatError;

/// Currency-pair conversion factors keyed by `"{FROM}_{TO}"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ExchangeRates {
    rates: BTreeMap<String, Decimal>,
}

pub fn pair_key(from: Currency, to: Currency) -> String {
    format!("{}_{}", from, to)
}

impl ExchangeRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallback table used when no fresher rates are available (base EUR).
    pub fn eur_defaults() -> Self {
        let mut rates = Self::new();
        for (from, rate) in [
            (Currency::Usd, dec!(0.92)),
            (Currency::Gbp, dec!(1.17)),
            (Currency::Chf, dec!(1.06)),
            (Currency::Cad, dec!(0.68)),
            (Currency::Aud, dec!(0.62)),
            (Currency::Sar, dec!(0.25)),
            (Currency::Aed, dec!(0.26)),
            (Currency::Qar, dec!(0.26)),
        ] {
            rates.insert(from, Currency::Eur, rate);
        }
        rates
    }

    pub fn insert(&mut self, from: Currency, to: Currency, rate: Decimal) {
        self.rates.insert(pair_key(from, to), rate);
    }

    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.insert(from, to, rate);
        self
    }

    /// The direct pair only.
    pub fn get(&self, from: Currency, to: Currency) -> Option<Decimal> {
        self.rates.get(&pair_key(from, to)).copied()
    }

    /// Direct pair, or `1 / inverse` when only the opposite direction is known.
    ///
    /// Meant for suppliers assembling snapshots (e.g. metal price
    /// normalisation). [`convert_to_base`] never falls back to this.
    pub fn rate_or_inverse(&self, from: Currency, to: Currency) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = self.get(from, to) {
            return Some(rate);
        }
        self.get(to, from)
            .filter(|inverse| !inverse.is_zero())
            .and_then(|inverse| Decimal::ONE.checked_div(inverse))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Builds a two-way table from a provider response.
    ///
    /// `quotes` are `code -> rate` relative to `quote_base` (1 `quote_base` =
    /// `rate` units of `code`). Every usable quote yields both directions.
    /// When `target_base` differs, entries re-based on `target_base` are added
    /// as well. Codes outside the supported set and non-positive quotes are
    /// skipped.
    pub fn from_quotes<I, S>(quote_base: Currency, quotes: I, target_base: Currency) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        let mut parsed: Vec<(Currency, Decimal)> = Vec::new();

        for (code, rate) in quotes {
            let code = code.as_ref();
            let Ok(currency) = Currency::from_str(code) else {
                debug!("Skipping unsupported currency code {}", code);
                continue;
            };
            if rate <= Decimal::ZERO {
                warn!("Skipping non-positive quote {} for {}", rate, code);
                continue;
            }
            parsed.push((currency, rate));
        }

        for &(currency, rate) in &parsed {
            table.insert(quote_base, currency, rate);
            if let Some(inverse) = Decimal::ONE.checked_div(rate) {
                table.insert(currency, quote_base, inverse);
            }
        }
        table.insert(quote_base, quote_base, Decimal::ONE);

        if target_base != quote_base {
            match table.get(quote_base, target_base) {
                Some(base_to_target) if !base_to_target.is_zero() => {
                    for &(currency, base_to_code) in &parsed {
                        let Some(target_to_code) = base_to_code.checked_div(base_to_target) else {
                            continue;
                        };
                        if target_to_code.is_zero() {
                            continue;
                        }
                        table.insert(target_base, currency, target_to_code);
                        if let Some(inverse) = Decimal::ONE.checked_div(target_to_code) {
                            table.insert(currency, target_base, inverse);
                        }
                    }
                    table.insert(target_base, target_base, Decimal::ONE);
                }
                _ => warn!("Quotes for {} carry no rate to {}; table not re-based", quote_base, target_base),
            }
        }

        table
    }
}

/// Converts `amount` in `from` into `base`.
///
/// Identity when the currencies match. Otherwise reads the direct `FROM_BASE`
/// pair; a missing (or zero) factor is a [`ZakatError::MissingRate`]. No
/// inversion or triangulation is attempted.
pub fn convert_to_base(
    amount: Decimal,
    from: Currency,
    base: Currency,
    rates: &ExchangeRates,
) -> Result<Decimal, ZakatError> {
    if from == base {
        return Ok(amount);
    }

    match rates.get(from, base) {
        Some(rate) if !rate.is_zero() => amount
            .checked_mul(rate)
            .ok_or_else(|| ZakatError::overflow(format!("converting {} to {}", from, base))),
        _ => {
            warn!("Exchange rate not found for {} to {}", from, base);
            Err(ZakatError::MissingRate { from, to: base })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_needs_no_rate() {
        let empty = ExchangeRates::new();
        assert_eq!(
            convert_to_base(dec!(123.45), Currency::Sar, Currency::Sar, &empty).unwrap(),
            dec!(123.45)
        );
    }

    #[test]
    fn test_direct_pair() {
        let rates = ExchangeRates::eur_defaults();
        assert_eq!(
            convert_to_base(dec!(100), Currency::Usd, Currency::Eur, &rates).unwrap(),
            dec!(92.00)
        );
    }

    #[test]
    fn test_no_inversion() {
        // Only USD_EUR is present; EUR -> USD must fail.
        let rates = ExchangeRates::eur_defaults();
        let err = convert_to_base(dec!(100), Currency::Eur, Currency::Usd, &rates).unwrap_err();
        assert_eq!(err, ZakatError::MissingRate { from: Currency::Eur, to: Currency::Usd });
    }

    #[test]
    fn test_zero_rate_counts_as_missing() {
        let rates = ExchangeRates::new().with_rate(Currency::Gbp, Currency::Eur, Decimal::ZERO);
        assert!(convert_to_base(dec!(1), Currency::Gbp, Currency::Eur, &rates).is_err());
    }

    #[test]
    fn test_rate_or_inverse() {
        let rates = ExchangeRates::new().with_rate(Currency::Eur, Currency::Usd, dec!(1.25));
        assert_eq!(rates.rate_or_inverse(Currency::Usd, Currency::Eur), Some(dec!(0.8)));
        assert_eq!(rates.rate_or_inverse(Currency::Gbp, Currency::Eur), None);
    }

    #[test]
    fn test_from_quotes_two_way() {
        let quotes = vec![("EUR", dec!(0.8)), ("GBP", dec!(0.5)), ("XYZ", dec!(3)), ("SAR", dec!(0))];
        let rates = ExchangeRates::from_quotes(Currency::Usd, quotes, Currency::Usd);

        assert_eq!(rates.get(Currency::Usd, Currency::Eur), Some(dec!(0.8)));
        assert_eq!(rates.get(Currency::Eur, Currency::Usd), Some(dec!(1.25)));
        assert_eq!(rates.get(Currency::Gbp, Currency::Usd), Some(dec!(2)));
        assert_eq!(rates.get(Currency::Usd, Currency::Usd), Some(Decimal::ONE));
        assert_eq!(rates.get(Currency::Usd, Currency::Sar), None);
    }

    #[test]
    fn test_from_quotes_rebased() {
        // 1 USD = 0.8 EUR = 0.5 GBP  =>  1 EUR = 0.625 GBP
        let quotes = vec![("EUR", dec!(0.8)), ("GBP", dec!(0.5))];
        let rates = ExchangeRates::from_quotes(Currency::Usd, quotes, Currency::Eur);

        assert_eq!(rates.get(Currency::Eur, Currency::Gbp), Some(dec!(0.625)));
        assert_eq!(rates.get(Currency::Gbp, Currency::Eur), Some(dec!(1.6)));
        assert_eq!(rates.get(Currency::Eur, Currency::Eur), Some(Decimal::ONE));
        assert_eq!(
            convert_to_base(dec!(10), Currency::Gbp, Currency::Eur, &rates).unwrap(),
            dec!(16)
        );
    }

    #[test]
    fn test_serialises_as_flat_map() {
        let rates = ExchangeRates::new().with_rate(Currency::Usd, Currency::Eur, dec!(0.92));
        let json = serde_json::to_string(&rates).unwrap();
        assert_eq!(json, r#"{"USD_EUR":"0.92"}"#);
        let back: ExchangeRates = serde_json::from_str(r#"{"USD_EUR": 0.92}"#).unwrap();
        assert_eq!(back, rates);
    }
}

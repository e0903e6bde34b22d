//! Metal price snapshot and the seam for fetching it.
//!
//! The engine consumes [`MetalPrices`] as a plain value, already expressed per
//! gram in the settings' base currency. Fetching live quotes is the caller's
//! job; the `PriceProvider` trait is the boundary for that.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assets::MetalKind;
use crate::config::Currency;
use crate::inputs::IntoZakatDecimal;
use crate::rates::ExchangeRates;
use crate::types::ZakatError;

/// 1 Troy Ounce = 31.1034768 Grams
pub const TROY_OUNCE_IN_GRAMS: Decimal = dec!(31.1034768);

/// Per-gram gold and silver prices in base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetalPrices {
    pub gold_per_gram: Decimal,
    pub silver_per_gram: Decimal,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
}

impl Default for MetalPrices {
    /// Fallback prices (EUR) used before any live quote is available.
    fn default() -> Self {
        Self {
            gold_per_gram: dec!(60),
            silver_per_gram: dec!(0.7),
            last_updated: DateTime::<Utc>::default(),
        }
    }
}

impl MetalPrices {
    /// Creates a new snapshot stamped now. Negative prices are rejected.
    pub fn new(
        gold_per_gram: impl IntoZakatDecimal,
        silver_per_gram: impl IntoZakatDecimal,
    ) -> Result<Self, ZakatError> {
        let gold = gold_per_gram.into_zakat_decimal()?;
        let silver = silver_per_gram.into_zakat_decimal()?;

        if gold < Decimal::ZERO || silver < Decimal::ZERO {
            return Err(ZakatError::invalid_input("prices", "Metal prices must be non-negative"));
        }

        Ok(Self {
            gold_per_gram: gold,
            silver_per_gram: silver,
            last_updated: Utc::now(),
        })
    }

    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = at;
        self
    }

    pub fn per_gram(&self, metal: MetalKind) -> Decimal {
        match metal {
            MetalKind::Gold => self.gold_per_gram,
            MetalKind::Silver => self.silver_per_gram,
        }
    }

    /// Normalises spot quotes given per troy ounce in `source` currency into
    /// per-gram prices in `base`.
    ///
    /// Conversion accepts either direction of the pair in `rates`, since the
    /// quotes often come in a different currency than the one the table is
    /// keyed on.
    pub fn from_troy_ounce_quotes(
        gold_per_ounce: impl IntoZakatDecimal,
        silver_per_ounce: impl IntoZakatDecimal,
        source: Currency,
        base: Currency,
        rates: &ExchangeRates,
        at: DateTime<Utc>,
    ) -> Result<Self, ZakatError> {
        let gold_oz = gold_per_ounce.into_zakat_decimal()?;
        let silver_oz = silver_per_ounce.into_zakat_decimal()?;

        let mut gold = gold_oz / TROY_OUNCE_IN_GRAMS;
        let mut silver = silver_oz / TROY_OUNCE_IN_GRAMS;

        if source != base {
            let rate = rates
                .rate_or_inverse(source, base)
                .ok_or(ZakatError::MissingRate { from: source, to: base })?;
            gold = gold
                .checked_mul(rate)
                .ok_or_else(|| ZakatError::overflow("converting the gold quote"))?;
            silver = silver
                .checked_mul(rate)
                .ok_or_else(|| ZakatError::overflow("converting the silver quote"))?;
        }

        Ok(Self::new(gold, silver)?.updated_at(at))
    }
}

/// Trait for fetching current metal prices.
///
/// Implementors can fetch prices from various sources:
/// - Static values for testing
/// - REST APIs
/// - A local cache
#[cfg(feature = "async")]
#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches current metal prices in the requested base currency.
    async fn get_prices(&self, base: Currency) -> Result<MetalPrices, ZakatError>;
}

/// A static price provider for testing and offline use.
#[derive(Debug, Clone)]
pub struct StaticPriceProvider {
    prices: MetalPrices,
}

impl StaticPriceProvider {
    pub fn new(
        gold_per_gram: impl IntoZakatDecimal,
        silver_per_gram: impl IntoZakatDecimal,
    ) -> Result<Self, ZakatError> {
        Ok(Self {
            prices: MetalPrices::new(gold_per_gram, silver_per_gram)?,
        })
    }

    pub fn from_prices(prices: MetalPrices) -> Self {
        Self { prices }
    }

    pub fn prices(&self) -> &MetalPrices {
        &self.prices
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl PriceProvider for StaticPriceProvider {
    async fn get_prices(&self, _base: Currency) -> Result<MetalPrices, ZakatError> {
        Ok(self.prices.clone())
    }
}

/// Wraps a primary provider and falls back to a fixed snapshot when it fails.
#[cfg(feature = "async")]
pub struct BestEffortPriceProvider<P> {
    primary: P,
    fallback: MetalPrices,
}

#[cfg(feature = "async")]
impl<P: PriceProvider> BestEffortPriceProvider<P> {
    pub fn new(primary: P, fallback: MetalPrices) -> Self {
        Self { primary, fallback }
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl<P: PriceProvider> PriceProvider for BestEffortPriceProvider<P> {
    async fn get_prices(&self, base: Currency) -> Result<MetalPrices, ZakatError> {
        match self.primary.get_prices(base).await {
            Ok(prices) => Ok(prices),
            Err(e) => {
                tracing::warn!("Primary price provider failed, using fallback prices: {}", e);
                Ok(self.fallback.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_prices_rejects_negative() {
        assert!(MetalPrices::new(-10, 1).is_err());
        assert!(MetalPrices::new(60, 0.7).is_ok());
    }

    #[test]
    fn test_per_gram_selects_metal() {
        let prices = MetalPrices::new(60, 0.7).unwrap();
        assert_eq!(prices.per_gram(MetalKind::Gold), dec!(60));
        assert_eq!(prices.per_gram(MetalKind::Silver), dec!(0.7));
    }

    #[test]
    fn test_troy_ounce_same_currency() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let prices = MetalPrices::from_troy_ounce_quotes(
            dec!(311.034768),
            dec!(31.1034768),
            Currency::Eur,
            Currency::Eur,
            &ExchangeRates::new(),
            at,
        )
        .unwrap();
        assert_eq!(prices.gold_per_gram, dec!(10));
        assert_eq!(prices.silver_per_gram, dec!(1));
        assert_eq!(prices.last_updated, at);
    }

    #[test]
    fn test_troy_ounce_uses_inverse_rate() {
        // Only EUR_USD is known; USD quotes must still convert into EUR.
        let rates = ExchangeRates::new().with_rate(Currency::Eur, Currency::Usd, dec!(1.25));
        let prices = MetalPrices::from_troy_ounce_quotes(
            dec!(311.034768),
            dec!(0),
            Currency::Usd,
            Currency::Eur,
            &rates,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(prices.gold_per_gram, dec!(8));
    }

    #[test]
    fn test_troy_ounce_missing_rate() {
        let res = MetalPrices::from_troy_ounce_quotes(
            2000,
            25,
            Currency::Usd,
            Currency::Gbp,
            &ExchangeRates::eur_defaults(),
            Utc::now(),
        );
        assert_eq!(res.unwrap_err(), ZakatError::MissingRate { from: Currency::Usd, to: Currency::Gbp });
    }

    #[test]
    fn test_troy_ounce_conversion_overflow() {
        // Decimal::MAX per ounce is still ~2.5e27 per gram; a rate of 1000 leaves the range.
        let rates = ExchangeRates::new().with_rate(Currency::Usd, Currency::Eur, dec!(1000));
        let res = MetalPrices::from_troy_ounce_quotes(
            Decimal::MAX,
            dec!(25),
            Currency::Usd,
            Currency::Eur,
            &rates,
            Utc::now(),
        );
        assert!(matches!(res, Err(ZakatError::Overflow { .. })));
    }

    #[cfg(feature = "async")]
    struct FailingProvider;

    #[cfg(feature = "async")]
    #[async_trait::async_trait]
    impl PriceProvider for FailingProvider {
        async fn get_prices(&self, _base: Currency) -> Result<MetalPrices, ZakatError> {
            Err(ZakatError::Storage("offline".to_string()))
        }
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_best_effort_falls_back() {
        let provider = BestEffortPriceProvider::new(FailingProvider, MetalPrices::default());
        let prices = provider.get_prices(Currency::Eur).await.unwrap();
        assert_eq!(prices.gold_per_gram, dec!(60));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticPriceProvider::new(100, 2).unwrap();
        let prices = provider.get_prices(Currency::Usd).await.unwrap();
        assert_eq!(prices.gold_per_gram, dec!(100));
    }
}

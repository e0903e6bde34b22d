//! Per-item valuation in base currency.
//!
//! Dispatches on [`AssetType`] into three value domains: fiat amounts,
//! crypto holdings and weight-based precious metals. An item with missing
//! payload fields is worth zero; only a missing exchange rate is an error.

pub mod crypto;
pub mod fiat;
pub mod precious_metals;

use rust_decimal::Decimal;

use crate::assets::{AssetType, InventoryItem};
use crate::config::{Currency, ZakatSettings};
use crate::pricing::MetalPrices;
use crate::rates::{convert_to_base, ExchangeRates};
use crate::types::ZakatError;

/// The market snapshot an item is valued against.
#[derive(Debug, Clone, Copy)]
pub struct ValuationContext<'a> {
    pub base_currency: Currency,
    pub rates: &'a ExchangeRates,
    pub prices: &'a MetalPrices,
}

impl<'a> ValuationContext<'a> {
    pub fn new(settings: &ZakatSettings, rates: &'a ExchangeRates, prices: &'a MetalPrices) -> Self {
        Self {
            base_currency: settings.base_currency,
            rates,
            prices,
        }
    }

    /// Converts an amount into the context's base currency.
    pub fn convert(&self, amount: Decimal, from: Currency) -> Result<Decimal, ZakatError> {
        convert_to_base(amount, from, self.base_currency, self.rates)
    }
}

/// Values an item in base currency according to its type.
pub fn value_item(item: &InventoryItem, ctx: &ValuationContext<'_>) -> Result<Decimal, ZakatError> {
    match item.asset_type {
        AssetType::Cash
        | AssetType::MinorCash
        | AssetType::LifeInsurance
        | AssetType::Brokerage
        | AssetType::ForeignCash
        | AssetType::TradeStock
        | AssetType::Other
        | AssetType::LoanReceivable => fiat::value(item, ctx),
        AssetType::Crypto => crypto::value(item, ctx),
        AssetType::Gold | AssetType::Silver | AssetType::Jewelry | AssetType::Watch => {
            precious_metals::value(item, ctx)
        }
        AssetType::Unknown => Ok(Decimal::ZERO),
    }
}

/// Convenience wrapper taking the raw calculation inputs.
pub fn calculate_item_value(
    item: &InventoryItem,
    settings: &ZakatSettings,
    rates: &ExchangeRates,
    prices: &MetalPrices,
) -> Result<Decimal, ZakatError> {
    value_item(item, &ValuationContext::new(settings, rates, prices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MetalKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dispatch_by_type() {
        let settings = ZakatSettings::default();
        let rates = ExchangeRates::eur_defaults();
        let prices = MetalPrices::default();

        let loan = InventoryItem::new("Loan to cousin", AssetType::LoanReceivable)
            .with_amount(1000, Currency::Usd)
            .unwrap();
        assert_eq!(calculate_item_value(&loan, &settings, &rates, &prices).unwrap(), dec!(920));

        let watch = InventoryItem::new("Watch", AssetType::Watch)
            .with_metal(MetalKind::Gold, 10, 0.75)
            .unwrap();
        assert_eq!(calculate_item_value(&watch, &settings, &rates, &prices).unwrap(), dec!(450));

        let mut unknown = InventoryItem::new("???", AssetType::Unknown);
        unknown.amount = Some(dec!(500));
        unknown.currency = Some(Currency::Eur);
        assert_eq!(calculate_item_value(&unknown, &settings, &rates, &prices).unwrap(), Decimal::ZERO);
    }
}

use rust_decimal::Decimal;

use super::ValuationContext;
use crate::assets::InventoryItem;
use crate::types::ZakatError;

/// Value of a metal holding: `weight × purity × price_per_gram`.
///
/// Purity is a fraction (0.75 for 18K). No rounding happens here.
pub fn calculate_metal_value(
    weight_grams: Decimal,
    purity: Decimal,
    price_per_gram: Decimal,
) -> Result<Decimal, ZakatError> {
    weight_grams
        .checked_mul(purity)
        .and_then(|pure_weight| pure_weight.checked_mul(price_per_gram))
        .ok_or_else(|| ZakatError::overflow("calculating metal value"))
}

/// Gold, silver, jewelry and watches.
///
/// Weight, purity and metal kind together select the metal valuation. When
/// any of them is missing or zero, an `amount` + `currency` estimate is used
/// instead; otherwise the item is worth zero.
pub fn value(item: &InventoryItem, ctx: &ValuationContext<'_>) -> Result<Decimal, ZakatError> {
    if let (Some(weight), Some(purity), Some(metal)) = (item.weight_grams, item.purity, item.metal)
        && !weight.is_zero()
        && !purity.is_zero()
    {
        return calculate_metal_value(weight, purity, ctx.prices.per_gram(metal));
    }

    match (item.amount, item.currency) {
        (Some(amount), Some(currency)) if !amount.is_zero() => ctx.convert(amount, currency),
        _ => Ok(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetType, MetalKind};
    use crate::config::Currency;
    use crate::pricing::MetalPrices;
    use crate::rates::ExchangeRates;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metal_value() {
        assert_eq!(calculate_metal_value(dec!(100), dec!(0.9999), dec!(60)).unwrap(), dec!(5999.4));
        assert_eq!(calculate_metal_value(Decimal::ZERO, dec!(0.9999), dec!(60)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_silver_uses_silver_price() {
        let rates = ExchangeRates::new();
        let prices = MetalPrices::new(60, 0.7).unwrap();
        let ctx = ValuationContext { base_currency: Currency::Eur, rates: &rates, prices: &prices };

        let item = InventoryItem::new("Coins", AssetType::Silver)
            .with_metal(MetalKind::Silver, 1000, 0.925)
            .unwrap();
        assert_eq!(value(&item, &ctx).unwrap(), dec!(647.5));
    }

    #[test]
    fn test_weight_path_beats_estimate() {
        let rates = ExchangeRates::eur_defaults();
        let prices = MetalPrices::new(60, 0.7).unwrap();
        let ctx = ValuationContext { base_currency: Currency::Eur, rates: &rates, prices: &prices };

        let item = InventoryItem::new("Bar", AssetType::Gold)
            .with_metal(MetalKind::Gold, 10, 1)
            .unwrap()
            .with_amount(9999, Currency::Usd)
            .unwrap();
        assert_eq!(value(&item, &ctx).unwrap(), dec!(600));
    }

    #[test]
    fn test_falls_back_to_estimate() {
        let rates = ExchangeRates::eur_defaults();
        let prices = MetalPrices::new(60, 0.7).unwrap();
        let ctx = ValuationContext { base_currency: Currency::Eur, rates: &rates, prices: &prices };

        // No purity recorded: use the appraised amount.
        let mut item = InventoryItem::new("Heirloom", AssetType::Jewelry)
            .with_amount(1000, Currency::Usd)
            .unwrap();
        item.metal = Some(MetalKind::Gold);
        item.weight_grams = Some(dec!(12));
        assert_eq!(value(&item, &ctx).unwrap(), dec!(920));

        let empty = InventoryItem::new("Empty", AssetType::Gold);
        assert_eq!(value(&empty, &ctx).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_purity_or_weight_falls_back_to_estimate() {
        let rates = ExchangeRates::eur_defaults();
        let prices = MetalPrices::new(60, 0.7).unwrap();
        let ctx = ValuationContext { base_currency: Currency::Eur, rates: &rates, prices: &prices };

        let mut item = InventoryItem::new("Ring", AssetType::Gold)
            .with_amount(500, Currency::Eur)
            .unwrap();
        item.metal = Some(MetalKind::Gold);
        item.weight_grams = Some(dec!(10));
        item.purity = Some(dec!(0));
        assert_eq!(value(&item, &ctx).unwrap(), dec!(500));

        item.weight_grams = Some(dec!(0));
        item.purity = Some(dec!(0.75));
        assert_eq!(value(&item, &ctx).unwrap(), dec!(500));

        // Nothing to fall back on.
        item.amount = None;
        assert_eq!(value(&item, &ctx).unwrap(), Decimal::ZERO);
    }
}

use rust_decimal::Decimal;

use super::ValuationContext;
use crate::assets::InventoryItem;
use crate::types::ZakatError;

/// Crypto holdings.
///
/// A direct `amount` + `currency` wins over `quantity × price_per_token`.
/// A zero quantity or price is treated like a missing one.
pub fn value(item: &InventoryItem, ctx: &ValuationContext<'_>) -> Result<Decimal, ZakatError> {
    let Some(currency) = item.currency else {
        return Ok(Decimal::ZERO);
    };

    if let Some(amount) = item.amount {
        return ctx.convert(amount, currency);
    }

    match (item.quantity, item.price_per_token) {
        (Some(quantity), Some(price)) if !quantity.is_zero() && !price.is_zero() => {
            let total = quantity
                .checked_mul(price)
                .ok_or_else(|| ZakatError::overflow(format!("valuing {} tokens", item.token.as_deref().unwrap_or("crypto"))))?;
            ctx.convert(total, currency)
        }
        _ => Ok(Decimal::ZERO),
    }
}

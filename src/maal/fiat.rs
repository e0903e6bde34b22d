use rust_decimal::Decimal;

use super::ValuationContext;
use crate::assets::InventoryItem;
use crate::types::ZakatError;

/// Currency-denominated assets: cash, policies, accounts, receivables.
///
/// Zero unless both `amount` and `currency` are set.
pub fn value(item: &InventoryItem, ctx: &ValuationContext<'_>) -> Result<Decimal, ZakatError> {
    match (item.amount, item.currency) {
        (Some(amount), Some(currency)) => ctx.convert(amount, currency),
        _ => Ok(Decimal::ZERO),
    }
}

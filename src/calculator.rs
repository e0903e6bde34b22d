//! # Calculation Engine
//!
//! Turns an inventory, its deductions, the settings and a market snapshot into
//! a fully itemised [`CalculationSnapshot`].
//!
//! ## Aggregation
//! All included items are valued in base currency and summed into a single
//! pool before comparing with the nisab (*Dam' al-Amwal*): wealth that is
//! below nisab item by item still becomes payable once combined.
//!
//! ## Numeric policy
//! Intermediate values are kept at full `Decimal` precision. Only the final
//! levy is rounded, once, to `settings.rounding` places (half away from zero).
//!
//! The engine is pure: it never mutates its inputs and the only notion of
//! "now" is the explicit reference date used for the due date.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::assets::{AssetType, DeductionItem, InventoryItem};
use crate::config::{Currency, ZakatSettings, ZAKAT_RATE};
use crate::fiqh::should_include_item;
use crate::hawl::calculate_next_due_date;
use crate::maal::{value_item, ValuationContext};
use crate::pricing::MetalPrices;
use crate::rates::{convert_to_base, ExchangeRates};
use crate::types::{Breakdown, CalculationSnapshot, CalculationStatus, ItemBreakdown, ZakatError};

/// Holds the per-calculation context: settings, market snapshot and the
/// reference date.
#[derive(Debug, Clone)]
pub struct ZakatCalculator<'a> {
    settings: &'a ZakatSettings,
    rates: &'a ExchangeRates,
    prices: &'a MetalPrices,
    today: NaiveDate,
}

impl<'a> ZakatCalculator<'a> {
    pub fn new(settings: &'a ZakatSettings, rates: &'a ExchangeRates, prices: &'a MetalPrices) -> Self {
        Self {
            settings,
            rates,
            prices,
            today: Local::now().date_naive(),
        }
    }

    /// Pins the reference date used for the due-date computation.
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Runs the full calculation.
    ///
    /// Any missing exchange rate (for an included item or any deduction)
    /// aborts with an error; there is no partial result.
    pub fn calculate(
        &self,
        inventory: &[InventoryItem],
        deductions: &[DeductionItem],
    ) -> Result<CalculationSnapshot, ZakatError> {
        // Fail fast before touching any item.
        self.settings.validate()?;

        let ctx = ValuationContext::new(self.settings, self.rates, self.prices);
        let items = inventory
            .iter()
            .map(|item| self.breakdown_row(item, &ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let gross_assets = checked_sum(
            items.iter().filter(|row| row.included).map(|row| row.converted_value),
            "summing gross assets",
        )?;
        let deductions_total = calculate_deductions(deductions, self.settings.base_currency, self.rates)?;
        let net_assets = gross_assets
            .checked_sub(deductions_total)
            .ok_or_else(|| ZakatError::overflow("netting deductions"))?
            .max(Decimal::ZERO);
        let nisab_value = self.settings.nisab_threshold(self.prices)?;

        let zakat_due = if net_assets >= nisab_value {
            net_assets
                .checked_mul(ZAKAT_RATE)
                .ok_or_else(|| ZakatError::overflow("applying the zakat rate"))?
                .round_dp_with_strategy(self.settings.rounding, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };

        let by_type = group_by_type(&items)?;
        let due_date = calculate_next_due_date(
            self.settings.anchor_date.gregorian,
            self.settings.calendar,
            self.today,
        )?;

        let status = if zakat_due > Decimal::ZERO {
            CalculationStatus::Due
        } else {
            CalculationStatus::BelowNisab
        };

        debug!(
            %gross_assets, %deductions_total, %net_assets, %nisab_value, %zakat_due, %status,
            "Zakat calculation complete"
        );

        Ok(CalculationSnapshot {
            due_date,
            settings: self.settings.clone(),
            inventory: inventory.to_vec(),
            deductions: deductions.to_vec(),
            exchange_rates: self.rates.clone(),
            metal_prices: self.prices.clone(),
            gross_assets,
            deductions_total,
            net_assets,
            nisab_value,
            zakat_due,
            breakdown: Breakdown { by_type, items },
            status,
        })
    }

    fn breakdown_row(&self, item: &InventoryItem, ctx: &ValuationContext<'_>) -> Result<ItemBreakdown, ZakatError> {
        let inclusion = should_include_item(item, self.settings);
        // Excluded items are never valued, so their rates need not exist.
        let converted_value = if inclusion.included {
            value_item(item, ctx)?
        } else {
            Decimal::ZERO
        };

        debug!(
            id = %item.id, asset_type = %item.asset_type, included = inclusion.included,
            reason = %inclusion.reason, %converted_value,
            "Item evaluated"
        );

        Ok(ItemBreakdown {
            id: item.id.clone(),
            label: item.label.clone(),
            asset_type: item.asset_type,
            original_value: item.amount.unwrap_or(Decimal::ZERO),
            original_currency: item.currency,
            converted_value,
            included: inclusion.included,
            reason: inclusion.reason.to_string(),
        })
    }
}

/// Computes the snapshot for `today` (local date).
pub fn calculate(
    inventory: &[InventoryItem],
    deductions: &[DeductionItem],
    settings: &ZakatSettings,
    rates: &ExchangeRates,
    prices: &MetalPrices,
) -> Result<CalculationSnapshot, ZakatError> {
    ZakatCalculator::new(settings, rates, prices).calculate(inventory, deductions)
}

/// Sum of all deductions in base currency. No inclusion rules apply.
///
/// Every amount must be positive, including deductions loaded from storage
/// that never went through [`DeductionItem::new`].
pub fn calculate_deductions(
    deductions: &[DeductionItem],
    base: Currency,
    rates: &ExchangeRates,
) -> Result<Decimal, ZakatError> {
    let converted = deductions
        .iter()
        .map(|deduction| {
            if deduction.amount <= Decimal::ZERO {
                return Err(ZakatError::invalid_input(
                    "amount",
                    format!("Deduction '{}' must have a positive amount", deduction.label),
                ));
            }
            convert_to_base(deduction.amount, deduction.currency, base, rates)
        })
        .collect::<Result<Vec<_>, _>>()?;
    checked_sum(converted.into_iter(), "summing deductions")
}

fn group_by_type(items: &[ItemBreakdown]) -> Result<BTreeMap<AssetType, Decimal>, ZakatError> {
    let mut by_type: BTreeMap<AssetType, Decimal> = BTreeMap::new();
    for row in items.iter().filter(|row| row.included) {
        let entry = by_type.entry(row.asset_type).or_insert(Decimal::ZERO);
        *entry = entry
            .checked_add(row.converted_value)
            .ok_or_else(|| ZakatError::overflow("grouping values by asset type"))?;
    }
    Ok(by_type)
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>, operation: &str) -> Result<Decimal, ZakatError> {
    values.try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or_else(|| ZakatError::overflow(operation))
    })
}

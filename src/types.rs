use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assets::{AssetType, DeductionItem, InventoryItem};
use crate::config::{Currency, ZakatSettings};
use crate::hawl::DueDate;
use crate::pricing::MetalPrices;
use crate::rates::ExchangeRates;

/// Errors raised while preparing or running a Zakat calculation.
///
/// Any error aborts the whole calculation: the engine never hands back a
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ZakatError {
    /// A required `FROM_TO` conversion factor is absent (or zero) in the rate table.
    #[error("Exchange rate not found for {from} to {to}")]
    MissingRate { from: Currency, to: Currency },

    /// Settings that were never validated or could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Rejected constructor input (negative amount, purity out of range, ...).
    #[error("Invalid input [{field}]: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A value left the representable `Decimal` range.
    #[error("Arithmetic overflow while {operation}")]
    Overflow { operation: String },

    /// History file could not be read, written or parsed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ZakatError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ZakatError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        ZakatError::Overflow {
            operation: operation.into(),
        }
    }
}

/// Outcome of comparing net assets against the nisab.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationStatus {
    Due,
    BelowNisab,
}

/// One audit row per inventory item, whether it was included or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemBreakdown {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// The raw `amount` field as entered (zero when absent).
    pub original_value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_currency: Option<Currency>,
    /// Value in base currency; always zero for excluded items.
    pub converted_value: Decimal,
    pub included: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    /// Sum of included converted values per asset type.
    pub by_type: BTreeMap<AssetType, Decimal>,
    pub items: Vec<ItemBreakdown>,
}

/// The full output of one `calculate` run, before the caller stamps it.
///
/// Inputs are captured verbatim so a stored snapshot can be audited or
/// recomputed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationSnapshot {
    pub due_date: DueDate,

    pub settings: ZakatSettings,
    pub inventory: Vec<InventoryItem>,
    pub deductions: Vec<DeductionItem>,
    pub exchange_rates: ExchangeRates,
    pub metal_prices: MetalPrices,

    pub gross_assets: Decimal,
    pub deductions_total: Decimal,
    pub net_assets: Decimal,
    pub nisab_value: Decimal,
    pub zakat_due: Decimal,

    pub breakdown: Breakdown,
    pub status: CalculationStatus,
}

impl CalculationSnapshot {
    pub fn is_due(&self) -> bool {
        self.status == CalculationStatus::Due
    }

    pub fn included_items(&self) -> impl Iterator<Item = &ItemBreakdown> {
        self.breakdown.items.iter().filter(|row| row.included)
    }

    pub fn excluded_items(&self) -> impl Iterator<Item = &ItemBreakdown> {
        self.breakdown.items.iter().filter(|row| !row.included)
    }

    /// Finds the audit row for a given inventory item id.
    pub fn item(&self, id: &str) -> Option<&ItemBreakdown> {
        self.breakdown.items.iter().find(|row| row.id == id)
    }
}

/// A snapshot stamped with an identity, ready for history and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: CalculationSnapshot,
}

impl CalculationResult {
    /// Assigns a fresh `calc_` id and the current UTC time.
    pub fn stamp(snapshot: CalculationSnapshot) -> Self {
        Self::with_identity(format!("calc_{}", Uuid::new_v4().simple()), Utc::now(), snapshot)
    }

    pub fn with_identity(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        snapshot: CalculationSnapshot,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            snapshot,
        }
    }

    pub fn base_currency(&self) -> Currency {
        self.snapshot.settings.base_currency
    }
}

//! Inventory and deduction value objects.
//!
//! Items are plain snapshots created by the caller (forms, storage, CLI input)
//! and handed to the engine by reference. Field names and enum tags follow the
//! persisted JSON format, so items written by earlier versions load as-is.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Currency;
use crate::inputs::IntoZakatDecimal;
use crate::types::ZakatError;

/// The closed set of asset kinds an inventory item can hold.
///
/// `Unknown` absorbs tags this version does not recognise (e.g. a type removed
/// in a later release) so that old data degrades to "excluded" instead of
/// failing to load.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Cash,
    /// Cash held on behalf of a minor child.
    #[serde(rename = "CASH_MINOR")]
    #[strum(serialize = "CASH_MINOR")]
    MinorCash,
    /// Life-insurance-like savings policy.
    #[serde(rename = "ASSURANCE_VIE")]
    #[strum(serialize = "ASSURANCE_VIE")]
    LifeInsurance,
    /// Brokerage or stock account.
    #[serde(rename = "STOCKS", alias = "PEA")]
    #[strum(serialize = "STOCKS")]
    Brokerage,
    Crypto,
    #[serde(rename = "FX_CASH")]
    #[strum(serialize = "FX_CASH")]
    ForeignCash,
    Gold,
    Silver,
    Jewelry,
    Watch,
    LoanReceivable,
    /// Business inventory held for trade.
    TradeStock,
    Other,
    #[serde(other)]
    Unknown,
}

impl AssetType {
    /// Types valued by weight × purity × price when metal data is present.
    pub fn is_metal_valued(&self) -> bool {
        matches!(
            self,
            AssetType::Gold | AssetType::Silver | AssetType::Jewelry | AssetType::Watch
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ownership {
    #[default]
    #[serde(rename = "SELF")]
    Own,
    Minor,
    Spouse,
    Joint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MetalKind {
    Gold,
    Silver,
}

/// Likelihood of recovering a receivable loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStrength {
    /// Acknowledged by a solvent debtor; zakatable.
    Strong,
    /// Doubtful or denied; not zakatable until recovered.
    Weak,
}

/// One asset owned by the user or a declared relation.
///
/// Only the payload fields relevant to `asset_type` are expected to be set:
/// `amount`/`currency` for fiat-like assets, `metal`/`weight_grams`/`purity`
/// for metals, `quantity`/`price_per_token`/`currency` for crypto. Missing
/// fields value to zero rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default)]
    pub ownership: Ownership,
    /// Bank name, wallet, physical location...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal: Option<MetalKind>,
    #[serde(rename = "weightG", default, skip_serializing_if = "Option::is_none")]
    pub weight_grams: Option<Decimal>,
    /// Fraction in [0, 1], e.g. 0.999 for 99.9%.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purity: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_token: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_strength: Option<LoanStrength>,

    /// `Some(true)` forces inclusion, `Some(false)` forces exclusion,
    /// `None` defers to the Fiqh rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_override: Option<bool>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Creates an empty item with a fresh id.
    pub fn new(label: impl Into<String>, asset_type: AssetType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            asset_type,
            ownership: Ownership::default(),
            location: None,
            currency: None,
            amount: None,
            metal: None,
            weight_grams: None,
            purity: None,
            token: None,
            quantity: None,
            price_per_token: None,
            loan_strength: None,
            include_override: None,
            archived: false,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets a currency amount (fiat assets, or an estimate for metals/crypto).
    pub fn with_amount(mut self, amount: impl IntoZakatDecimal, currency: Currency) -> Result<Self, ZakatError> {
        let amount = amount.into_zakat_decimal()?;
        if amount < Decimal::ZERO {
            return Err(ZakatError::invalid_input("amount", "Amount must be non-negative"));
        }
        self.amount = Some(amount);
        self.currency = Some(currency);
        Ok(self)
    }

    /// Sets the metal payload. Purity is a fraction, not a karat.
    pub fn with_metal(
        mut self,
        metal: MetalKind,
        weight_grams: impl IntoZakatDecimal,
        purity: impl IntoZakatDecimal,
    ) -> Result<Self, ZakatError> {
        let weight = weight_grams.into_zakat_decimal()?;
        let purity = purity.into_zakat_decimal()?;
        if weight < Decimal::ZERO {
            return Err(ZakatError::invalid_input("weightG", "Weight must be non-negative"));
        }
        if purity < Decimal::ZERO || purity > Decimal::ONE {
            return Err(ZakatError::invalid_input("purity", "Purity must be between 0 and 1"));
        }
        self.metal = Some(metal);
        self.weight_grams = Some(weight);
        self.purity = Some(purity);
        Ok(self)
    }

    /// Sets a crypto holding valued as quantity × price per token.
    pub fn with_crypto(
        mut self,
        token: impl Into<String>,
        quantity: impl IntoZakatDecimal,
        price_per_token: impl IntoZakatDecimal,
        currency: Currency,
    ) -> Result<Self, ZakatError> {
        let quantity = quantity.into_zakat_decimal()?;
        let price = price_per_token.into_zakat_decimal()?;
        if quantity < Decimal::ZERO {
            return Err(ZakatError::invalid_input("quantity", "Quantity must be non-negative"));
        }
        if price < Decimal::ZERO {
            return Err(ZakatError::invalid_input("pricePerToken", "Price must be non-negative"));
        }
        self.token = Some(token.into());
        self.quantity = Some(quantity);
        self.price_per_token = Some(price);
        self.currency = Some(currency);
        Ok(self)
    }

    pub fn with_loan_strength(mut self, strength: LoanStrength) -> Self {
        self.loan_strength = Some(strength);
        self
    }

    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the manual tri-state override.
    pub fn with_override(mut self, include: Option<bool>) -> Self {
        self.include_override = include;
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// A short-term liability subtracted from gross assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeductionItem {
    pub id: String,
    pub label: String,
    pub currency: Currency,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl DeductionItem {
    pub fn new(
        label: impl Into<String>,
        amount: impl IntoZakatDecimal,
        currency: Currency,
    ) -> Result<Self, ZakatError> {
        let amount = amount.into_zakat_decimal()?;
        if amount <= Decimal::ZERO {
            return Err(ZakatError::invalid_input("amount", "Deduction amount must be positive"));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            currency,
            amount,
            due_date: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_stored_item() {
        let json = r#"{
            "id": "inv_1",
            "label": "Wedding ring",
            "type": "JEWELRY",
            "ownership": "SELF",
            "metal": "GOLD",
            "weightG": 8,
            "purity": 0.75,
            "archived": false,
            "notes": "",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }"#;

        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.asset_type, AssetType::Jewelry);
        assert_eq!(item.ownership, Ownership::Own);
        assert_eq!(item.metal, Some(MetalKind::Gold));
        assert_eq!(item.weight_grams, Some(dec!(8)));
        assert_eq!(item.purity, Some(dec!(0.75)));
        assert_eq!(item.include_override, None);
    }

    #[test]
    fn test_unrecognised_type_loads_as_unknown() {
        let json = r#"{ "id": "x", "label": "Old", "type": "TIMESHARE" }"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.asset_type, AssetType::Unknown);
    }

    #[test]
    fn test_legacy_brokerage_tag() {
        let json = r#"{ "id": "x", "label": "PEA", "type": "PEA" }"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.asset_type, AssetType::Brokerage);
    }

    #[test]
    fn test_builder_validation() {
        assert!(InventoryItem::new("Cash", AssetType::Cash).with_amount(-1, Currency::Eur).is_err());
        assert!(
            InventoryItem::new("Bar", AssetType::Gold)
                .with_metal(MetalKind::Gold, 10, 1.5)
                .is_err()
        );
        assert!(DeductionItem::new("Rent", 0, Currency::Eur).is_err());
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(AssetType::MinorCash.to_string(), "CASH_MINOR");
        assert_eq!(AssetType::LoanReceivable.to_string(), "LOAN_RECEIVABLE");
        assert_eq!(
            serde_json::to_string(&AssetType::ForeignCash).unwrap(),
            "\"FX_CASH\""
        );
    }
}

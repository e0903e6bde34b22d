use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::inputs::IntoZakatDecimal;
use crate::pricing::MetalPrices;
use crate::types::ZakatError;

/// Gold weight defining the nisab (85g).
pub const NISAB_GOLD_GRAMS: Decimal = dec!(85);
/// Silver weight defining the nisab (595g).
pub const NISAB_SILVER_GRAMS: Decimal = dec!(595);
/// The levy applied to net zakatable wealth (2.5%).
pub const ZAKAT_RATE: Decimal = dec!(0.025);
/// `Decimal` cannot carry more fractional digits than this.
pub const MAX_ROUNDING: u32 = 28;

/// Currencies accepted for inventory, deductions and the base currency.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
    Chf,
    Cad,
    Aud,
    Sar,
    Aed,
    Qar,
}

/// Calendar governing the Hawl recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarSystem {
    /// Lunar year, approximated as a fixed 354 days.
    #[default]
    Hijri,
    /// Solar year, same month/day every year.
    Gregorian,
}

/// How the nisab threshold is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NisabMode {
    /// 85g × gold price per gram
    #[default]
    Gold,
    /// 595g × silver price per gram
    Silver,
    /// A user-fixed amount in base currency
    Manual,
}

/// Treatment of gold/silver jewelry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JewelryPolicy {
    /// Jewelry is valued by its metal content.
    #[default]
    IncludeMetal,
    /// Jewelry worn personally is exempt.
    ExcludePersonal,
}

/// The date the user's wealth first reached nisab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnchorDate {
    pub gregorian: NaiveDate,
    /// Free-text Hijri label as entered by the user; never computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hijri: Option<String>,
}

impl AnchorDate {
    pub fn new(gregorian: NaiveDate) -> Self {
        Self {
            gregorian,
            hijri: None,
        }
    }
}

/// Jurisprudential toggles for the inclusion rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FiqhSettings {
    pub include_minors_cash: bool,
    pub jewelry_policy: JewelryPolicy,
    /// Counts gold/silver content of personal items such as watches.
    pub include_personal_gold_content: bool,
}

impl Default for FiqhSettings {
    fn default() -> Self {
        Self {
            include_minors_cash: true,
            jewelry_policy: JewelryPolicy::IncludeMetal,
            include_personal_gold_content: false,
        }
    }
}

/// Per-calculation configuration. There is no global state: every
/// calculation receives its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ZakatSettings {
    pub base_currency: Currency,
    pub calendar: CalendarSystem,
    pub anchor_date: AnchorDate,
    pub nisab_mode: NisabMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nisab_manual_amount: Option<Decimal>,
    pub fiqh: FiqhSettings,
    /// Decimal places kept on the final levy.
    pub rounding: u32,
}

impl Default for ZakatSettings {
    fn default() -> Self {
        ZakatSettings {
            base_currency: Currency::Eur,
            calendar: CalendarSystem::Hijri,
            anchor_date: AnchorDate::new(Local::now().date_naive()),
            nisab_mode: NisabMode::Gold,
            nisab_manual_amount: None,
            fiqh: FiqhSettings::default(),
            rounding: 2,
        }
    }
}

impl std::str::FromStr for ZakatSettings {
    type Err = ZakatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let settings: ZakatSettings = serde_json::from_str(s)
            .map_err(|e| ZakatError::InvalidConfiguration(format!("Failed to parse settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }
}

impl ZakatSettings {
    pub fn new(base_currency: Currency, anchor: NaiveDate) -> Self {
        Self {
            base_currency,
            anchor_date: AnchorDate::new(anchor),
            ..Default::default()
        }
    }

    /// Validates the settings for logical consistency.
    pub fn validate(&self) -> Result<(), ZakatError> {
        if self.rounding > MAX_ROUNDING {
            return Err(ZakatError::InvalidConfiguration(format!(
                "Rounding precision {} exceeds the maximum of {}",
                self.rounding, MAX_ROUNDING
            )));
        }

        if let Some(amount) = self.nisab_manual_amount
            && amount < Decimal::ZERO
        {
            return Err(ZakatError::InvalidConfiguration(
                "Manual nisab amount must be non-negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Loads settings from a JSON file in the application's storage format.
    pub fn try_from_json(path: &str) -> Result<Self, ZakatError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ZakatError::InvalidConfiguration(format!("Failed to read settings file: {}", e)))?;
        content.parse()
    }

    // ========== Fluent Helper Methods ==========

    pub fn with_base_currency(mut self, currency: Currency) -> Self {
        self.base_currency = currency;
        self
    }

    pub fn with_calendar(mut self, calendar: CalendarSystem) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_anchor(mut self, date: NaiveDate) -> Self {
        self.anchor_date = AnchorDate::new(date);
        self
    }

    pub fn with_nisab_mode(mut self, mode: NisabMode) -> Self {
        self.nisab_mode = mode;
        self
    }

    /// Switches to a fixed nisab amount expressed in base currency.
    pub fn with_manual_nisab(mut self, amount: impl IntoZakatDecimal) -> Result<Self, ZakatError> {
        let amount = amount.into_zakat_decimal()?;
        if amount < Decimal::ZERO {
            return Err(ZakatError::InvalidConfiguration(
                "Manual nisab amount must be non-negative".to_string(),
            ));
        }
        self.nisab_mode = NisabMode::Manual;
        self.nisab_manual_amount = Some(amount);
        Ok(self)
    }

    pub fn with_fiqh(mut self, fiqh: FiqhSettings) -> Self {
        self.fiqh = fiqh;
        self
    }

    pub fn with_rounding(mut self, places: u32) -> Self {
        self.rounding = places;
        self
    }

    /// The nisab threshold in base currency for the given metal prices.
    pub fn nisab_threshold(&self, prices: &MetalPrices) -> Result<Decimal, ZakatError> {
        calculate_nisab(self, prices)
    }
}

/// Computes the minimum-wealth threshold in base currency.
///
/// Metal prices are expected to already be expressed in the settings' base
/// currency. A manual mode without an amount yields zero.
pub fn calculate_nisab(settings: &ZakatSettings, prices: &MetalPrices) -> Result<Decimal, ZakatError> {
    match settings.nisab_mode {
        NisabMode::Gold => NISAB_GOLD_GRAMS
            .checked_mul(prices.gold_per_gram)
            .ok_or_else(|| ZakatError::overflow("calculating gold nisab")),
        NisabMode::Silver => NISAB_SILVER_GRAMS
            .checked_mul(prices.silver_per_gram)
            .ok_or_else(|| ZakatError::overflow("calculating silver nisab")),
        NisabMode::Manual => match settings.nisab_manual_amount {
            Some(amount) if amount < Decimal::ZERO => Err(ZakatError::InvalidConfiguration(
                "Manual nisab amount must be non-negative".to_string(),
            )),
            Some(amount) => Ok(amount),
            None => Ok(Decimal::ZERO),
        },
    }
}

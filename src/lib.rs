//! # Zakatinator
//!
//! A pure calculation engine for the annual Zakat on personal wealth: values a
//! household inventory in one base currency, applies configurable fiqh
//! inclusion rules, compares the pooled net wealth with the nisab and reports
//! the levy with a per-item audit trail and the next Hawl due date.
//!
//! ```rust
//! use zakatinator::prelude::*;
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//! let settings = ZakatSettings::new(Currency::Eur, today);
//! let rates = ExchangeRates::eur_defaults();
//! let prices = MetalPrices::default();
//!
//! let inventory = vec![
//!     InventoryItem::new("Savings", AssetType::Cash)
//!         .with_amount(10_000, Currency::Eur)
//!         .unwrap(),
//! ];
//!
//! let snapshot = ZakatCalculator::new(&settings, &rates, &prices)
//!     .as_of(today)
//!     .calculate(&inventory, &[])
//!     .unwrap();
//! assert!(snapshot.is_due());
//! ```

pub mod assets;
pub mod calculator;
pub mod config;
pub mod fiqh;
pub mod hawl;
pub mod history;
pub mod inputs;
pub mod maal;
pub mod prelude;
pub mod pricing;
pub mod rates;
pub mod report;
pub mod types;

pub use calculator::{calculate, ZakatCalculator};
pub use config::{Currency, ZakatSettings};
pub use types::{CalculationResult, CalculationSnapshot, ZakatError};

//! Commonly used types in one import.
//!
//! ```rust
//! use zakatinator::prelude::*;
//! ```

pub use crate::assets::{AssetType, DeductionItem, InventoryItem, LoanStrength, MetalKind, Ownership};
pub use crate::calculator::{calculate, calculate_deductions, ZakatCalculator};
pub use crate::config::{
    calculate_nisab, AnchorDate, CalendarSystem, Currency, FiqhSettings, JewelryPolicy, NisabMode, ZakatSettings,
    NISAB_GOLD_GRAMS, NISAB_SILVER_GRAMS, ZAKAT_RATE,
};
pub use crate::fiqh::{should_include_item, Inclusion, InclusionReason};
pub use crate::hawl::{calculate_next_due_date, DueDate, HawlTracker, LUNAR_YEAR_DAYS};
pub use crate::history::{HistoryStore, Payment, PaymentDraft, ZakatHistory};
pub use crate::inputs::IntoZakatDecimal;
pub use crate::maal::{calculate_item_value, value_item, ValuationContext};
pub use crate::maal::precious_metals::calculate_metal_value;
pub use crate::pricing::{MetalPrices, StaticPriceProvider};
#[cfg(feature = "async")]
pub use crate::pricing::{BestEffortPriceProvider, PriceProvider};
pub use crate::rates::{convert_to_base, ExchangeRates};
pub use crate::report::render_text;
pub use crate::types::{
    Breakdown, CalculationResult, CalculationSnapshot, CalculationStatus, ItemBreakdown, ZakatError,
};

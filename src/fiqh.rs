//! # Fiqh Compliance: Inclusion Rules
//!
//! Decides whether an inventory item counts towards zakatable wealth.
//! Evaluation order, first match wins:
//!
//! 1. A manual override is honoured verbatim, even for archived items.
//! 2. Archived items are excluded.
//! 3. Type-specific rulings:
//!    - minors' cash follows `include_minors_cash`;
//!    - gold/silver jewelry follows the jewelry policy, other jewelry is exempt;
//!    - gold/silver watches follow `include_personal_gold_content`, others are exempt;
//!    - receivable loans count only when strong (*dayn qawi*);
//!    - every other known type is a standard zakatable asset;
//!    - unrecognised types are excluded, never silently counted.

use serde::{Deserialize, Serialize};

use crate::assets::{AssetType, InventoryItem, LoanStrength};
use crate::config::{JewelryPolicy, ZakatSettings};

/// Why an item was included or excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum InclusionReason {
    #[strum(to_string = "Manual inclusion")]
    ManualInclusion,
    #[strum(to_string = "Manual exclusion")]
    ManualExclusion,
    #[strum(to_string = "Archived item")]
    Archived,
    #[strum(to_string = "Minor's cash included per settings")]
    MinorsCashIncluded,
    #[strum(to_string = "Minor's cash excluded per settings")]
    MinorsCashExcluded,
    #[strum(to_string = "Jewelry metal value included per fiqh setting")]
    JewelryMetalIncluded,
    #[strum(to_string = "Personal jewelry excluded per fiqh setting")]
    PersonalJewelryExcluded,
    #[strum(to_string = "Non-precious metal jewelry excluded")]
    NonPreciousJewelry,
    #[strum(to_string = "Personal gold/silver content included per setting")]
    PersonalMetalIncluded,
    #[strum(to_string = "Personal gold/silver content excluded per setting")]
    PersonalMetalExcluded,
    #[strum(to_string = "Non-precious metal watch excluded")]
    NonPreciousWatch,
    #[strum(to_string = "Strong loan included")]
    StrongLoan,
    #[strum(to_string = "Weak/uncertain loan excluded")]
    WeakLoan,
    #[strum(to_string = "Standard zakatable asset")]
    StandardAsset,
    #[strum(to_string = "Unknown asset type")]
    UnknownType,
}

/// Verdict for a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inclusion {
    pub included: bool,
    pub reason: InclusionReason,
}

impl Inclusion {
    fn include(reason: InclusionReason) -> Self {
        Self { included: true, reason }
    }

    fn exclude(reason: InclusionReason) -> Self {
        Self { included: false, reason }
    }

    fn either(included: bool, yes: InclusionReason, no: InclusionReason) -> Self {
        if included {
            Self::include(yes)
        } else {
            Self::exclude(no)
        }
    }
}

/// Evaluates the inclusion rules for one item.
pub fn should_include_item(item: &InventoryItem, settings: &ZakatSettings) -> Inclusion {
    if let Some(forced) = item.include_override {
        return Inclusion::either(forced, InclusionReason::ManualInclusion, InclusionReason::ManualExclusion);
    }

    if item.archived {
        return Inclusion::exclude(InclusionReason::Archived);
    }

    let fiqh = &settings.fiqh;
    match item.asset_type {
        AssetType::MinorCash => Inclusion::either(
            fiqh.include_minors_cash,
            InclusionReason::MinorsCashIncluded,
            InclusionReason::MinorsCashExcluded,
        ),

        AssetType::Jewelry => match item.metal {
            Some(_) => Inclusion::either(
                fiqh.jewelry_policy == JewelryPolicy::IncludeMetal,
                InclusionReason::JewelryMetalIncluded,
                InclusionReason::PersonalJewelryExcluded,
            ),
            None => Inclusion::exclude(InclusionReason::NonPreciousJewelry),
        },

        AssetType::Watch => match item.metal {
            Some(_) => Inclusion::either(
                fiqh.include_personal_gold_content,
                InclusionReason::PersonalMetalIncluded,
                InclusionReason::PersonalMetalExcluded,
            ),
            None => Inclusion::exclude(InclusionReason::NonPreciousWatch),
        },

        AssetType::LoanReceivable => Inclusion::either(
            item.loan_strength == Some(LoanStrength::Strong),
            InclusionReason::StrongLoan,
            InclusionReason::WeakLoan,
        ),

        AssetType::Cash
        | AssetType::LifeInsurance
        | AssetType::Brokerage
        | AssetType::Crypto
        | AssetType::ForeignCash
        | AssetType::Gold
        | AssetType::Silver
        | AssetType::TradeStock
        | AssetType::Other => Inclusion::include(InclusionReason::StandardAsset),

        AssetType::Unknown => Inclusion::exclude(InclusionReason::UnknownType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MetalKind;
    use crate::config::{Currency, FiqhSettings};

    #[test]
    fn test_override_beats_archived() {
        let settings = ZakatSettings::default();
        let item = InventoryItem::new("Old account", AssetType::Cash)
            .archived(true)
            .with_override(Some(true));

        let verdict = should_include_item(&item, &settings);
        assert!(verdict.included);
        assert_eq!(verdict.reason, InclusionReason::ManualInclusion);
    }

    #[test]
    fn test_override_false_beats_standard() {
        let settings = ZakatSettings::default();
        let item = InventoryItem::new("Cash", AssetType::Cash).with_override(Some(false));
        assert_eq!(
            should_include_item(&item, &settings),
            Inclusion { included: false, reason: InclusionReason::ManualExclusion }
        );
    }

    #[test]
    fn test_archived_excluded() {
        let settings = ZakatSettings::default();
        let item = InventoryItem::new("Closed", AssetType::Cash).archived(true);
        assert_eq!(should_include_item(&item, &settings).reason, InclusionReason::Archived);
    }

    #[test]
    fn test_watch_requires_precious_metal() {
        let settings = ZakatSettings::default().with_fiqh(FiqhSettings {
            include_personal_gold_content: true,
            ..Default::default()
        });

        let steel = InventoryItem::new("Steel watch", AssetType::Watch)
            .with_amount(5000, Currency::Eur)
            .unwrap();
        assert_eq!(should_include_item(&steel, &settings).reason, InclusionReason::NonPreciousWatch);

        let gold = InventoryItem::new("Gold watch", AssetType::Watch)
            .with_metal(MetalKind::Gold, 40, 0.75)
            .unwrap();
        assert!(should_include_item(&gold, &settings).included);
    }

    #[test]
    fn test_loan_without_strength_is_weak() {
        let settings = ZakatSettings::default();
        let item = InventoryItem::new("IOU", AssetType::LoanReceivable);
        assert_eq!(
            should_include_item(&item, &settings),
            Inclusion { included: false, reason: InclusionReason::WeakLoan }
        );
    }

    #[test]
    fn test_reason_text() {
        assert_eq!(InclusionReason::StandardAsset.to_string(), "Standard zakatable asset");
        assert_eq!(InclusionReason::UnknownType.to_string(), "Unknown asset type");
    }
}

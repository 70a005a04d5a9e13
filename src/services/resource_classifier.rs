use crate::{
    constants::{BALANCE_SUFFIX, PRODUCTION_INFIX},
    decoding::calibration::{weight_from_rules, Calibration, WeightRule},
    models::{DisplayCategory, ResourceCategory},
};
use rust_decimal::Decimal;
use serde::Serialize;

// Keyed by resource name, `_BALANCE` stripped.
const RESOURCE_TABLE: &[(&str, ResourceCategory)] = &[
    // Common
    ("WOOD", ResourceCategory::Common),
    ("STONE", ResourceCategory::Common),
    ("COAL", ResourceCategory::Common),
    ("COPPER", ResourceCategory::Common),
    ("OBSIDIAN", ResourceCategory::Common),
    // Uncommon
    ("SILVER", ResourceCategory::Uncommon),
    ("GOLD", ResourceCategory::Uncommon),
    ("IRONWOOD", ResourceCategory::Uncommon),
    ("COLD_IRON", ResourceCategory::Uncommon),
    // Rare
    ("MITHRAL", ResourceCategory::Rare),
    ("DEEP_CRYSTAL", ResourceCategory::Rare),
    ("RUBY", ResourceCategory::Rare),
    ("DIAMONDS", ResourceCategory::Rare),
    ("SAPPHIRE", ResourceCategory::Rare),
    // Epic
    ("HARTWOOD", ResourceCategory::Epic),
    ("IGNIUM", ResourceCategory::Epic),
    ("TRUE_ICE", ResourceCategory::Epic),
    ("TWILIGHT_QUARTZ", ResourceCategory::Epic),
    // Legendary
    ("ADAMANTINE", ResourceCategory::Legendary),
    ("ETHEREAL_SILICA", ResourceCategory::Legendary),
    ("DRAGONHIDE", ResourceCategory::Legendary),
    // Special
    ("LABOR", ResourceCategory::Labor),
    ("WHEAT", ResourceCategory::Food),
    ("FISH", ResourceCategory::Food),
    ("DONKEY", ResourceCategory::Transport),
    ("LORDS", ResourceCategory::Lords),
    ("ANCIENT_FRAGMENT", ResourceCategory::Other),
    // Military
    ("KNIGHT_T1", ResourceCategory::Military),
    ("KNIGHT_T2", ResourceCategory::Military),
    ("KNIGHT_T3", ResourceCategory::Military),
    ("PALADIN_T1", ResourceCategory::Military),
    ("PALADIN_T2", ResourceCategory::Military),
    ("PALADIN_T3", ResourceCategory::Military),
    ("CROSSBOWMAN_T1", ResourceCategory::Military),
    ("CROSSBOWMAN_T2", ResourceCategory::Military),
    ("CROSSBOWMAN_T3", ResourceCategory::Military),
    ("ARCHER_T1", ResourceCategory::Military),
    ("ARCHER_T2", ResourceCategory::Military),
    ("ARCHER_T3", ResourceCategory::Military),
];

// Grouped with Labor/Lords/Transport regardless of raw category.
const SPECIAL_RESOURCES: &[&str] = &["ANCIENT_FRAGMENT"];

struct PatternRule {
    label: &'static str,
    applies: fn(&str) -> bool,
    category: ResourceCategory,
}

fn is_tiered_unit(name: &str) -> bool {
    ["_T1", "_T2", "_T3"].iter().any(|tier| name.ends_with(tier))
}

fn is_ice(name: &str) -> bool {
    name.contains("ICE")
}

fn is_alchemical(name: &str) -> bool {
    name.contains("ALCHEMICAL_")
}

fn is_plain_wood(name: &str) -> bool {
    name.contains("WOOD") && !name.contains("IRON")
}

// Consulted only when the exact table misses. First match wins.
const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        label: "tiered unit",
        applies: is_tiered_unit,
        category: ResourceCategory::Military,
    },
    PatternRule {
        label: "ice",
        applies: is_ice,
        category: ResourceCategory::Epic,
    },
    PatternRule {
        label: "alchemical",
        applies: is_alchemical,
        category: ResourceCategory::Rare,
    },
    PatternRule {
        label: "wood",
        applies: is_plain_wood,
        category: ResourceCategory::Common,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClass {
    pub resource: String,
    pub raw_category: ResourceCategory,
    pub display_category: DisplayCategory,
    pub sort_order: u8,
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_per_unit: Decimal,
}

/// Resource Classifier - maps raw field keys to category, grouping, order and weight
#[derive(Debug, Clone)]
pub struct ResourceClassifier {
    weights: Vec<WeightRule>,
}

impl ResourceClassifier {
    pub fn new(weights: Vec<WeightRule>) -> Self {
        Self { weights }
    }

    pub fn from_calibration(calibration: &Calibration) -> Self {
        Self::new(calibration.weights.clone())
    }

    /// Total over all inputs; unknown names classify as `Other` with weight 1.
    pub fn classify(&self, field: &str) -> ResourceClass {
        let resource = resource_name(field);
        let raw_category = raw_category(&resource);
        let display_category = if SPECIAL_RESOURCES.contains(&resource.as_str()) {
            DisplayCategory::Special
        } else {
            raw_category.display_category()
        };

        ResourceClass {
            weight_per_unit: weight_from_rules(&self.weights, &resource),
            sort_order: display_category.sort_order(),
            raw_category,
            display_category,
            resource,
        }
    }
}

impl Default for ResourceClassifier {
    fn default() -> Self {
        Self::from_calibration(&Calibration::default())
    }
}

/// Uppercased resource name with the balance or production suffix removed.
pub fn resource_name(field: &str) -> String {
    let upper = field.trim().to_ascii_uppercase();
    if let Some((name, _)) = upper.split_once(PRODUCTION_INFIX) {
        return name.to_string();
    }
    upper
        .strip_suffix(BALANCE_SUFFIX)
        .map(str::to_string)
        .unwrap_or(upper)
}

pub fn raw_category(resource: &str) -> ResourceCategory {
    if let Some((_, category)) = RESOURCE_TABLE.iter().find(|(name, _)| *name == resource) {
        return *category;
    }
    match PATTERN_RULES.iter().find(|rule| (rule.applies)(resource)) {
        Some(rule) => {
            tracing::trace!(resource, rule = rule.label, "Classified by pattern");
            rule.category
        }
        None => ResourceCategory::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn canonical_resources() -> impl Iterator<Item = &'static str> {
        RESOURCE_TABLE.iter().map(|(name, _)| *name)
    }

    /// Labels of every pattern rule that matches `resource`.
    fn pattern_matches(resource: &str) -> Vec<&'static str> {
        PATTERN_RULES
            .iter()
            .filter(|rule| (rule.applies)(resource))
            .map(|rule| rule.label)
            .collect()
    }

    #[test]
    fn exact_table_accepts_suffixed_and_bare_names() {
        let classifier = ResourceClassifier::default();
        let with_suffix = classifier.classify("WOOD_BALANCE");
        let bare = classifier.classify("WOOD");
        assert_eq!(with_suffix, bare);
        assert_eq!(bare.raw_category, ResourceCategory::Common);
        assert_eq!(bare.resource, "WOOD");
    }

    #[test]
    fn ironwood_is_uncommon_from_the_table() {
        let classifier = ResourceClassifier::default();
        assert_eq!(
            classifier.classify("IRONWOOD_BALANCE").raw_category,
            ResourceCategory::Uncommon
        );
    }

    #[test]
    fn pattern_fallbacks_apply_to_unlisted_names() {
        assert_eq!(raw_category("PIKEMAN_T2"), ResourceCategory::Military);
        assert_eq!(raw_category("FROZEN_ICE"), ResourceCategory::Epic);
        assert_eq!(raw_category("ALCHEMICAL_SILVER"), ResourceCategory::Rare);
        assert_eq!(raw_category("DRIFTWOOD"), ResourceCategory::Common);
        assert_eq!(raw_category("IRONBARKWOOD"), ResourceCategory::Other);
        assert_eq!(raw_category("ESSENCE"), ResourceCategory::Other);
    }

    #[test]
    fn production_fields_resolve_to_their_resource() {
        let classifier = ResourceClassifier::default();
        let class = classifier.classify("WHEAT_PRODUCTION.production_rate");
        assert_eq!(class.resource, "WHEAT");
        assert_eq!(class.raw_category, ResourceCategory::Food);
        assert_eq!(class.sort_order, 3);
    }

    #[test]
    fn special_grouping_covers_labor_lords_transport_and_fragments() {
        let classifier = ResourceClassifier::default();
        for field in ["LABOR_BALANCE", "LORDS_BALANCE", "DONKEY_BALANCE", "ANCIENT_FRAGMENT_BALANCE"] {
            let class = classifier.classify(field);
            assert_eq!(class.display_category, DisplayCategory::Special, "{field}");
            assert_eq!(class.sort_order, 1);
        }
    }

    #[test]
    fn military_weighs_five_regardless_of_tier() {
        let classifier = ResourceClassifier::default();
        for field in ["KNIGHT_T1_BALANCE", "PALADIN_T3_BALANCE", "ARCHER_T2_BALANCE"] {
            assert_eq!(classifier.classify(field).weight_per_unit, Decimal::from(5));
        }
    }

    #[test]
    fn weights_are_overridable_without_touching_categories() {
        let classifier = ResourceClassifier::new(vec![WeightRule {
            needles: vec!["ruby".to_string()],
            weight: Decimal::from(3),
        }]);
        let ruby = classifier.classify("RUBY_BALANCE");
        assert_eq!(ruby.weight_per_unit, Decimal::from(3));
        assert_eq!(ruby.raw_category, ResourceCategory::Rare);
        assert_eq!(classifier.classify("KNIGHT_T1").weight_per_unit, Decimal::ONE);
    }

    #[test]
    fn no_canonical_resource_matches_two_pattern_rules() {
        for name in canonical_resources() {
            let matches = pattern_matches(name);
            assert!(matches.len() <= 1, "{name} matches {matches:?}");
        }
    }

    #[test]
    fn table_has_no_duplicate_keys() {
        let mut names: Vec<&str> = canonical_resources().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    proptest! {
        #[test]
        fn classification_is_total(field in "[A-Za-z_.0-9 ]{0,40}") {
            let classifier = ResourceClassifier::default();
            let class = classifier.classify(&field);
            prop_assert!(ResourceCategory::ALL.contains(&class.raw_category));
            prop_assert!((1..=5).contains(&class.sort_order));
        }

        #[test]
        fn arbitrary_strings_never_panic(field in ".*") {
            let classifier = ResourceClassifier::default();
            let _ = classifier.classify(&field);
        }
    }
}

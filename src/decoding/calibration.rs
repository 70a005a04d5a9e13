//! Scale constants for turning on-chain integers into displayed quantities.
//!
//! These figures were recalibrated against live game data more than once, so
//! they are data rather than code: the built-in defaults can be replaced by a
//! JSON file (see `Config::calibration_path`).

use crate::{
    constants::DEFAULT_CAPACITY_DIVISOR,
    error::DecodeError,
    models::ResourceCategory,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleProfile {
    pub multiplier: u64,
    pub divisor: u64,
}

impl ScaleProfile {
    pub const fn new(multiplier: u64, divisor: u64) -> Self {
        Self {
            multiplier,
            divisor,
        }
    }
}

/// One profile per raw category. Missing keys in a calibration file keep the
/// built-in value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryScales {
    pub common: ScaleProfile,
    pub uncommon: ScaleProfile,
    pub rare: ScaleProfile,
    pub epic: ScaleProfile,
    pub legendary: ScaleProfile,
    pub labor: ScaleProfile,
    pub food: ScaleProfile,
    pub transport: ScaleProfile,
    pub lords: ScaleProfile,
    pub military: ScaleProfile,
    pub other: ScaleProfile,
}

impl Default for CategoryScales {
    fn default() -> Self {
        let tier = ScaleProfile::new(1, 1);
        Self {
            common: tier,
            uncommon: tier,
            rare: tier,
            epic: tier,
            legendary: tier,
            labor: ScaleProfile::new(64, 16_000),
            food: ScaleProfile::new(1, 250),
            transport: ScaleProfile::new(4, 1_000),
            lords: ScaleProfile::new(64, 16_000),
            military: ScaleProfile::new(4, 1_000),
            other: tier,
        }
    }
}

impl CategoryScales {
    pub fn get(&self, category: ResourceCategory) -> ScaleProfile {
        match category {
            ResourceCategory::Common => self.common,
            ResourceCategory::Uncommon => self.uncommon,
            ResourceCategory::Rare => self.rare,
            ResourceCategory::Epic => self.epic,
            ResourceCategory::Legendary => self.legendary,
            ResourceCategory::Labor => self.labor,
            ResourceCategory::Food => self.food,
            ResourceCategory::Transport => self.transport,
            ResourceCategory::Lords => self.lords,
            ResourceCategory::Military => self.military,
            ResourceCategory::Other => self.other,
        }
    }

    fn entries(&self) -> [(ResourceCategory, ScaleProfile); 11] {
        ResourceCategory::ALL.map(|category| (category, self.get(category)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatcher {
    Exact(String),
    Suffix(String),
}

impl NameMatcher {
    pub fn matches(&self, resource: &str) -> bool {
        match self {
            NameMatcher::Exact(name) => resource.eq_ignore_ascii_case(name),
            NameMatcher::Suffix(suffix) => resource
                .to_ascii_uppercase()
                .ends_with(&suffix.to_ascii_uppercase()),
        }
    }
}

/// Replaces the category multiplier for resources whose name matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierOverride {
    #[serde(rename = "match")]
    pub matcher: NameMatcher,
    pub multiplier: u64,
}

/// Weight per unit for every resource whose lowercase name contains one of
/// `needles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRule {
    pub needles: Vec<String>,
    pub weight: Decimal,
}

impl WeightRule {
    fn new(needles: &[&str], weight: Decimal) -> Self {
        Self {
            needles: needles.iter().map(|n| n.to_string()).collect(),
            weight,
        }
    }

    pub fn matches(&self, resource: &str) -> bool {
        let lower = resource.to_ascii_lowercase();
        self.needles
            .iter()
            .any(|needle| lower.contains(&needle.to_ascii_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub scales: CategoryScales,
    /// Evaluated top to bottom, first match wins.
    pub multiplier_overrides: Vec<MultiplierOverride>,
    pub capacity_divisor: u64,
    /// Evaluated top to bottom; no match means a weight of 1.
    pub weights: Vec<WeightRule>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            scales: CategoryScales::default(),
            multiplier_overrides: vec![
                MultiplierOverride {
                    matcher: NameMatcher::Exact("PALADIN_T3".to_string()),
                    multiplier: 256,
                },
                MultiplierOverride {
                    matcher: NameMatcher::Suffix("_T2".to_string()),
                    multiplier: 16,
                },
                MultiplierOverride {
                    matcher: NameMatcher::Suffix("_T3".to_string()),
                    multiplier: 64,
                },
                MultiplierOverride {
                    matcher: NameMatcher::Exact("FISH".to_string()),
                    multiplier: 16,
                },
            ],
            capacity_divisor: DEFAULT_CAPACITY_DIVISOR,
            weights: vec![
                WeightRule::new(&["knight", "paladin", "crossbowman", "archer"], Decimal::from(5)),
                WeightRule::new(&["wheat", "fish", "fragment"], Decimal::new(1, 1)),
                WeightRule::new(&["lords", "donkey"], Decimal::ZERO),
            ],
        }
    }
}

impl Calibration {
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let calibration: Calibration = serde_json::from_str(raw)?;
        calibration.validate()?;
        Ok(calibration)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let calibration = Self::from_json_str(&raw)?;
        tracing::info!("Loaded calibration table from {}", path.display());
        Ok(calibration)
    }

    /// Zero multipliers would erase balances and zero divisors cannot be divided by.
    pub fn validate(&self) -> std::result::Result<(), DecodeError> {
        for (category, profile) in self.scales.entries() {
            if profile.multiplier == 0 || profile.divisor == 0 {
                return Err(DecodeError::InvalidCalibration(format!(
                    "{category:?} scale must have non-zero multiplier and divisor"
                )));
            }
        }
        if let Some(rule) = self.multiplier_overrides.iter().find(|o| o.multiplier == 0) {
            return Err(DecodeError::InvalidCalibration(format!(
                "override {:?} has a zero multiplier",
                rule.matcher
            )));
        }
        if self.capacity_divisor == 0 {
            return Err(DecodeError::InvalidCalibration(
                "capacity_divisor must be non-zero".to_string(),
            ));
        }
        if self.weights.iter().any(|w| w.weight.is_sign_negative()) {
            return Err(DecodeError::InvalidCalibration(
                "weights must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Category profile with the first matching name override applied.
    pub fn profile_for(&self, resource: &str, category: ResourceCategory) -> ScaleProfile {
        let mut profile = self.scales.get(category);
        if let Some(rule) = self
            .multiplier_overrides
            .iter()
            .find(|rule| rule.matcher.matches(resource))
        {
            profile.multiplier = rule.multiplier;
        }
        profile
    }
}

pub fn weight_from_rules(rules: &[WeightRule], resource: &str) -> Decimal {
    rules
        .iter()
        .find(|rule| rule.matches(resource))
        .map(|rule| rule.weight)
        .unwrap_or(Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calibration_is_valid() {
        assert!(Calibration::default().validate().is_ok());
    }

    #[test]
    fn paladin_t3_override_wins_over_tier_suffix() {
        let calibration = Calibration::default();
        let profile = calibration.profile_for("PALADIN_T3", ResourceCategory::Military);
        assert_eq!(profile, ScaleProfile::new(256, 1_000));
        let knight = calibration.profile_for("KNIGHT_T3", ResourceCategory::Military);
        assert_eq!(knight.multiplier, 64);
    }

    #[test]
    fn tier_two_and_tier_one_military() {
        let calibration = Calibration::default();
        assert_eq!(
            calibration
                .profile_for("CROSSBOWMAN_T2", ResourceCategory::Military)
                .multiplier,
            16
        );
        assert_eq!(
            calibration
                .profile_for("ARCHER_T1", ResourceCategory::Military)
                .multiplier,
            4
        );
    }

    #[test]
    fn fish_uses_its_own_multiplier_but_wheat_does_not() {
        let calibration = Calibration::default();
        assert_eq!(
            calibration.profile_for("FISH", ResourceCategory::Food),
            ScaleProfile::new(16, 250)
        );
        assert_eq!(
            calibration.profile_for("WHEAT", ResourceCategory::Food),
            ScaleProfile::new(1, 250)
        );
    }

    #[test]
    fn weights_follow_substring_rules() {
        let calibration = Calibration::default();
        assert_eq!(weight_from_rules(&calibration.weights, "KNIGHT_T2"), Decimal::from(5));
        assert_eq!(weight_from_rules(&calibration.weights, "WHEAT"), Decimal::new(1, 1));
        assert_eq!(weight_from_rules(&calibration.weights, "ANCIENT_FRAGMENT"), Decimal::new(1, 1));
        assert_eq!(weight_from_rules(&calibration.weights, "LORDS"), Decimal::ZERO);
        assert_eq!(weight_from_rules(&calibration.weights, "DONKEY"), Decimal::ZERO);
        assert_eq!(weight_from_rules(&calibration.weights, "MITHRAL"), Decimal::ONE);
    }

    #[test]
    fn partial_json_keeps_builtin_values() {
        let calibration =
            Calibration::from_json_str(r#"{ "scales": { "food": { "multiplier": 2, "divisor": 500 } } }"#)
                .expect("calibration should parse");
        assert_eq!(calibration.scales.food, ScaleProfile::new(2, 500));
        assert_eq!(calibration.scales.labor, ScaleProfile::new(64, 16_000));
        assert_eq!(calibration.capacity_divisor, DEFAULT_CAPACITY_DIVISOR);
        assert_eq!(calibration.multiplier_overrides.len(), 4);
    }

    #[test]
    fn overrides_parse_from_json() {
        let calibration = Calibration::from_json_str(
            r#"{ "multiplier_overrides": [ { "match": { "suffix": "_T3" }, "multiplier": 32 } ] }"#,
        )
        .expect("calibration should parse");
        assert_eq!(
            calibration
                .profile_for("PALADIN_T3", ResourceCategory::Military)
                .multiplier,
            32
        );
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let err = Calibration::from_json_str(r#"{ "scales": { "military": { "multiplier": 4, "divisor": 0 } } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("Military"));
    }

    #[test]
    fn zero_capacity_divisor_is_rejected() {
        assert!(Calibration::from_json_str(r#"{ "capacity_divisor": 0 }"#).is_err());
    }
}

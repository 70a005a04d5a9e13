use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name → hex string, as returned by the query service for one entity.
/// Ordered so every walk over a record is deterministic.
pub type RawFieldRecord = BTreeMap<String, String>;

// ==================== CATEGORIES ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceCategory {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Labor,
    Food,
    Transport,
    Lords,
    Military,
    Other,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 11] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
        Self::Labor,
        Self::Food,
        Self::Transport,
        Self::Lords,
        Self::Military,
        Self::Other,
    ];

    pub fn display_category(self) -> DisplayCategory {
        match self {
            Self::Common | Self::Uncommon | Self::Rare | Self::Epic | Self::Legendary => {
                DisplayCategory::Resources
            }
            Self::Labor | Self::Lords | Self::Transport => DisplayCategory::Special,
            Self::Food => DisplayCategory::Food,
            Self::Military => DisplayCategory::Military,
            Self::Other => DisplayCategory::Other,
        }
    }

    /// Common and uncommon balances are compressed on-chain for realms above level 1.
    pub fn is_level_compressed(self) -> bool {
        matches!(self, Self::Common | Self::Uncommon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DisplayCategory {
    Resources,
    Special,
    Food,
    Military,
    Other,
}

impl DisplayCategory {
    /// Ascending order is display priority.
    pub fn sort_order(self) -> u8 {
        match self {
            Self::Special => 1,
            Self::Military => 2,
            Self::Food => 3,
            Self::Resources => 4,
            Self::Other => 5,
        }
    }
}

// ==================== RESOURCES ====================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedResource {
    pub name: String,
    pub raw_category: ResourceCategory,
    pub display_category: DisplayCategory,
    pub sort_order: u8,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_per_unit: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub weight: Decimal,
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub production_rate_per_hour: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub pending_amount: Option<Decimal>,
}

/// A decode problem tied to the record field that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field: String,
    pub message: String,
}

/// Aggregated view of one raw record. An empty record yields an empty list
/// and zero totals with capacity left unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub resources: Vec<DecodedResource>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_weight: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub capacity_weight: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub capacity_used_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FieldWarning>,
}

// ==================== REALM ====================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmSnapshot {
    pub id: u64,
    pub entity_id: u64,
    pub level: u32,
    pub name: String,
    pub owner_name: Option<String>,
    pub resources: Vec<DecodedResource>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_weight: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub capacity_weight: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub capacity_used_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FieldWarning>,
    pub fetched_at: DateTime<Utc>,
}

/// One entry of a realm listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmListing {
    pub id: u64,
    pub entity_id: u64,
    pub name: String,
    pub owner_name: Option<String>,
}

// ==================== API RESPONSE ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

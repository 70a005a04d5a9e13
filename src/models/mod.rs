// src/models/mod.rs
pub mod realm;

pub use realm::{
    ApiResponse,
    DecodedResource,
    DisplayCategory,
    FieldWarning,
    RealmListing,
    RawFieldRecord,
    RealmSnapshot,
    ResourceCategory,
    ResourceSummary,
};

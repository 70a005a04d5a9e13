// All service modules
pub mod realm_queries;
pub mod realm_service;
pub mod resource_aggregator;
pub mod resource_classifier;

// Re-export for convenience
pub use realm_service::RealmService;

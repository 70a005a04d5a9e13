use super::{
    realm_queries::{
        realm_list_query, realm_lookup_query, record_from_row, resource_query, RealmRange,
        RealmRow,
    },
    resource_aggregator::ResourceAggregator,
    resource_classifier::ResourceClassifier,
};
use crate::{
    decoding::{Calibration, NumericDecoder, TextDecoder, TracingSink},
    error::{AppError, Result},
    integrations::SqlQueryService,
    models::{FieldWarning, RawFieldRecord, RealmListing, RealmSnapshot, ResourceSummary},
};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Recently viewed realms, oldest first.
struct RecentRealms {
    capacity: usize,
    entries: VecDeque<(u64, Arc<RealmSnapshot>)>,
}

impl RecentRealms {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    fn get(&self, realm_id: u64) -> Option<Arc<RealmSnapshot>> {
        self.entries
            .iter()
            .find(|(id, _)| *id == realm_id)
            .map(|(_, snapshot)| Arc::clone(snapshot))
    }

    fn insert(&mut self, realm_id: u64, snapshot: Arc<RealmSnapshot>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.retain(|(id, _)| *id != realm_id);
        self.entries.push_back((realm_id, snapshot));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}

/// Realm Service - fetches a realm from the indexer and decodes it into a snapshot
pub struct RealmService {
    queries: Arc<dyn SqlQueryService>,
    classifier: ResourceClassifier,
    decoder: NumericDecoder,
    text: TextDecoder,
    recent: RwLock<RecentRealms>,
}

impl RealmService {
    pub fn new(queries: Arc<dyn SqlQueryService>, calibration: Calibration, cache_size: usize) -> Self {
        Self {
            queries,
            classifier: ResourceClassifier::from_calibration(&calibration),
            decoder: NumericDecoder::new(calibration),
            text: TextDecoder::new(),
            recent: RwLock::new(RecentRealms::new(cache_size)),
        }
    }

    pub fn classifier(&self) -> &ResourceClassifier {
        &self.classifier
    }

    pub fn query_endpoint(&self) -> &str {
        self.queries.endpoint()
    }

    /// Decode a caller-supplied record without touching the network.
    pub fn summarize(&self, record: &RawFieldRecord, level: u32) -> ResourceSummary {
        ResourceAggregator::new(&self.classifier, &self.decoder).aggregate(record, level)
    }

    pub fn decode_name(&self, name: Option<&str>, warnings: &mut Vec<FieldWarning>) -> String {
        self.text.decode_with_sink(name, warnings)
    }

    pub async fn get_realm(&self, realm_id: u64) -> Result<Arc<RealmSnapshot>> {
        if let Some(snapshot) = self.recent.read().await.get(realm_id) {
            tracing::debug!(realm_id, "Serving realm from recent cache");
            return Ok(snapshot);
        }

        let realm_rows = self.queries.query(&realm_lookup_query(realm_id)).await?;
        let realm_row = realm_rows
            .first()
            .ok_or_else(|| AppError::NotFound(format!("Realm {realm_id} not found")))?;
        let realm = RealmRow::from_row(realm_row)?;
        tracing::info!(realm_id, entity_id = realm.entity_id, level = realm.level, "Found realm");

        let resource_rows = self.queries.query(&resource_query(realm.entity_id)).await?;
        let mut row_warnings: Vec<FieldWarning> = Vec::new();
        let record = match resource_rows.first() {
            Some(row) => record_from_row(row, &mut row_warnings),
            None => {
                tracing::warn!(realm_id, entity_id = realm.entity_id, "Realm has no resource row");
                RawFieldRecord::new()
            }
        };

        let snapshot = Arc::new(self.build_snapshot(&realm, &record, row_warnings, Utc::now()));
        self.recent.write().await.insert(realm_id, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Realms in `range`, optionally narrowed to names containing `name`
    /// (case-insensitive). Listings are not cached.
    pub async fn list_realms(&self, range: &RealmRange, name: Option<&str>) -> Result<Vec<RealmListing>> {
        let rows = self.queries.query(&realm_list_query(range)).await?;
        let needle = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase);

        let mut listings = Vec::with_capacity(rows.len());
        for row in &rows {
            let realm = match RealmRow::from_row(row) {
                Ok(realm) => realm,
                Err(err) => {
                    tracing::warn!("Skipping realm row: {}", err);
                    continue;
                }
            };
            let decoded = self.text.decode(realm.realm_name.as_deref());
            if let Some(needle) = &needle {
                if !decoded.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
            }
            listings.push(RealmListing {
                id: realm.id,
                entity_id: realm.entity_id,
                name: decoded,
                owner_name: self
                    .text
                    .decode_owner(realm.owner_name.as_deref(), &mut TracingSink),
            });
        }

        tracing::debug!(rows = rows.len(), listed = listings.len(), "Listed realms");
        Ok(listings)
    }

    /// `row_warnings` come first, then decode warnings in record order.
    pub fn build_snapshot(
        &self,
        realm: &RealmRow,
        record: &RawFieldRecord,
        row_warnings: Vec<FieldWarning>,
        fetched_at: DateTime<Utc>,
    ) -> RealmSnapshot {
        let summary = self.summarize(record, realm.level);
        let mut warnings = row_warnings;
        warnings.extend(summary.warnings);
        let name = self.text.decode_with_sink(realm.realm_name.as_deref(), &mut warnings);
        let owner_name = self.text.decode_owner(realm.owner_name.as_deref(), &mut warnings);

        RealmSnapshot {
            id: realm.id,
            entity_id: realm.entity_id,
            level: realm.level,
            name,
            owner_name,
            resources: summary.resources,
            total_weight: summary.total_weight,
            capacity_weight: summary.capacity_weight,
            capacity_used_pct: summary.capacity_used_pct,
            warnings,
            fetched_at,
        }
    }
}

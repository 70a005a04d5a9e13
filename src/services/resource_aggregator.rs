use super::resource_classifier::{resource_name, ResourceClass, ResourceClassifier};
use crate::{
    constants::{
        BALANCE_SUFFIX, CAPACITY_FIELD, PENDING_AMOUNT_FIELD, PRODUCTION_INFIX,
        PRODUCTION_RATE_FIELD, SECONDS_PER_HOUR,
    },
    decoding::{DecodeSink, NumericDecoder},
    error::DecodeError,
    models::{DecodedResource, FieldWarning, RawFieldRecord, ResourceSummary},
};
use rust_decimal::Decimal;
use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

/// Resource Aggregator - turns one raw record into the sorted, weighted resource list
pub struct ResourceAggregator<'a> {
    classifier: &'a ResourceClassifier,
    decoder: &'a NumericDecoder,
}

/// Record fields keyed by their uppercased name.
struct FieldIndex<'r> {
    fields: BTreeMap<String, (&'r str, &'r str)>,
}

impl<'r> FieldIndex<'r> {
    /// Keys that differ only in case collapse to the first in record order;
    /// the rest are reported and ignored.
    fn new(record: &'r RawFieldRecord, sink: &mut dyn DecodeSink) -> Self {
        let mut fields = BTreeMap::new();
        for (key, value) in record {
            match fields.entry(key.to_ascii_uppercase()) {
                Entry::Vacant(slot) => {
                    slot.insert((key.as_str(), value.as_str()));
                }
                Entry::Occupied(slot) => {
                    let (kept, _) = *slot.get();
                    sink.report(
                        key,
                        &DecodeError::DuplicateField {
                            kept: kept.to_string(),
                        },
                    );
                }
            }
        }
        Self { fields }
    }

    fn get(&self, key: &str) -> Option<(&'r str, &'r str)> {
        self.fields.get(&key.to_ascii_uppercase()).copied()
    }

    /// Every resource with a balance or production field, in name order.
    fn resource_names(&self) -> BTreeSet<String> {
        self.fields
            .keys()
            .filter(|key| key.ends_with(BALANCE_SUFFIX) || key.contains(PRODUCTION_INFIX))
            .map(|key| resource_name(key))
            .filter(|name| !name.is_empty())
            .collect()
    }
}

impl<'a> ResourceAggregator<'a> {
    pub fn new(classifier: &'a ResourceClassifier, decoder: &'a NumericDecoder) -> Self {
        Self {
            classifier,
            decoder,
        }
    }

    /// Pure in `(record, level)`: the same input always yields the same summary.
    pub fn aggregate(&self, record: &RawFieldRecord, level: u32) -> ResourceSummary {
        let mut warnings: Vec<FieldWarning> = Vec::new();
        let index = FieldIndex::new(record, &mut warnings);
        let mut resources = Vec::new();

        for name in index.resource_names() {
            let class = self.classifier.classify(&name);
            let balance_key = format!("{name}{BALANCE_SUFFIX}");
            let rate_key = format!("{name}{PRODUCTION_INFIX}{PRODUCTION_RATE_FIELD}");
            let pending_key = format!("{name}{PRODUCTION_INFIX}{PENDING_AMOUNT_FIELD}");

            let value = self
                .decode_field(&index, &balance_key, &class, level, &mut warnings)
                .unwrap_or(Decimal::ZERO);
            let production_rate_per_hour = self
                .decode_field(&index, &rate_key, &class, level, &mut warnings)
                .map(|per_second| saturating_mul(per_second, Decimal::from(SECONDS_PER_HOUR)))
                .filter(|rate| !rate.is_zero());
            let pending_amount = self
                .decode_field(&index, &pending_key, &class, level, &mut warnings)
                .filter(|pending| !pending.is_zero());

            if value.is_zero() && production_rate_per_hour.is_none() && pending_amount.is_none() {
                continue;
            }

            resources.push(DecodedResource {
                name: class.resource,
                raw_category: class.raw_category,
                display_category: class.display_category,
                sort_order: class.sort_order,
                value,
                weight_per_unit: class.weight_per_unit,
                weight: saturating_mul(value, class.weight_per_unit),
                production_rate_per_hour,
                pending_amount,
            });
        }

        resources.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| b.value.cmp(&a.value))
        });

        let total_weight = resources
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.checked_add(r.weight).unwrap_or(Decimal::MAX));

        let capacity_weight = index.get(CAPACITY_FIELD).and_then(|(key, raw)| {
            match self.decoder.try_decode_capacity(raw) {
                Ok(capacity) => Some(capacity),
                Err(err) => {
                    warnings.report(key, &err);
                    None
                }
            }
        });
        let capacity_used_pct = capacity_weight
            .filter(|capacity| !capacity.is_zero())
            .and_then(|capacity| total_weight.checked_div(capacity))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp(2));

        if !warnings.is_empty() {
            tracing::warn!(
                count = warnings.len(),
                "Recovered from malformed fields while aggregating resources"
            );
        }
        tracing::debug!(
            resources = resources.len(),
            level,
            "Aggregated resource record"
        );

        ResourceSummary {
            resources,
            total_weight,
            capacity_weight,
            capacity_used_pct,
            warnings,
        }
    }

    fn decode_field(
        &self,
        index: &FieldIndex<'_>,
        key: &str,
        class: &ResourceClass,
        level: u32,
        sink: &mut dyn DecodeSink,
    ) -> Option<Decimal> {
        let (field, raw) = index.get(key)?;
        Some(self.decoder.decode_resource(
            field,
            &class.resource,
            raw,
            class.raw_category,
            level,
            sink,
        ))
    }
}

fn saturating_mul(lhs: Decimal, rhs: Decimal) -> Decimal {
    lhs.checked_mul(rhs).unwrap_or(Decimal::MAX)
}

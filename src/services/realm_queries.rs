use crate::{
    constants::{
        DEFAULT_REALM_LIST_LIMIT, MAX_REALM_LIST_LIMIT, TABLE_RESOURCE, TABLE_SETTLE_REALM_DATA,
        TABLE_STRUCTURE,
    },
    decoding::{numeric::strip_hex_prefix, DecodeSink},
    error::{AppError, DecodeError, Result},
    models::RawFieldRecord,
};
use num_bigint::BigUint;
use num_traits::FromPrimitive;
use serde_json::{Number, Value};

/// Realm settlement data joined with the structure level. Ids are typed, so
/// nothing caller-supplied is spliced into the SQL text.
pub fn realm_lookup_query(realm_id: u64) -> String {
    format!(
        r#"SELECT r.id, r.entity_id, r.realm_name, r.owner_name, s."base.level" AS level FROM "{TABLE_SETTLE_REALM_DATA}" r LEFT JOIN "{TABLE_STRUCTURE}" s ON r.entity_id = s.entity_id WHERE r.id = {realm_id} LIMIT 1;"#
    )
}

/// Window of realm ids to list. Without bounds the newest realms come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmRange {
    pub min_id: Option<u64>,
    pub max_id: Option<u64>,
    pub limit: u32,
}

impl RealmRange {
    pub fn new(min_id: Option<u64>, max_id: Option<u64>, limit: Option<u32>) -> Result<Self> {
        if let (Some(min), Some(max)) = (min_id, max_id) {
            if min > max {
                return Err(AppError::BadRequest(format!(
                    "min_id {min} is greater than max_id {max}"
                )));
            }
        }
        Ok(Self {
            min_id,
            max_id,
            limit: limit
                .unwrap_or(DEFAULT_REALM_LIST_LIMIT)
                .clamp(1, MAX_REALM_LIST_LIMIT),
        })
    }
}

pub fn realm_list_query(range: &RealmRange) -> String {
    let (filter, order) = match (range.min_id, range.max_id) {
        (Some(min), Some(max)) => (format!(" WHERE id BETWEEN {min} AND {max}"), "ASC"),
        (Some(min), None) => (format!(" WHERE id >= {min}"), "ASC"),
        (None, Some(max)) => (format!(" WHERE id <= {max}"), "ASC"),
        (None, None) => (String::new(), "DESC"),
    };
    format!(
        r#"SELECT id, entity_id, realm_name, owner_name FROM "{TABLE_SETTLE_REALM_DATA}"{filter} ORDER BY id {order} LIMIT {};"#,
        range.limit
    )
}

/// Whole resource row: balances, production siblings and capacity.
pub fn resource_query(entity_id: u64) -> String {
    format!(r#"SELECT * FROM "{TABLE_RESOURCE}" WHERE entity_id = {entity_id} LIMIT 1;"#)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmRow {
    pub id: u64,
    pub entity_id: u64,
    pub realm_name: Option<String>,
    pub owner_name: Option<String>,
    pub level: u32,
}

impl RealmRow {
    pub fn from_row(row: &Value) -> Result<Self> {
        let id = row
            .get("id")
            .and_then(parse_u64)
            .ok_or_else(|| AppError::ExternalAPI("Realm row is missing a numeric id".to_string()))?;
        let entity_id = row.get("entity_id").and_then(parse_u64).ok_or_else(|| {
            AppError::ExternalAPI(format!("Realm {id} row is missing a numeric entity_id"))
        })?;

        Ok(Self {
            id,
            entity_id,
            realm_name: row.get("realm_name").and_then(non_empty_string),
            owner_name: row.get("owner_name").and_then(non_empty_string),
            level: parse_level(row.get("level")),
        })
    }
}

/// Flatten a resource row into a raw record. Integers become hex strings and
/// nulls are dropped, so absent and null fields look the same downstream.
///
/// Numbers wider than 64 bits only survive JSON as floats. Integral ones are
/// kept at float precision, negative or fractional ones are dropped, and both
/// are reported to `sink`.
pub fn record_from_row(row: &Value, sink: &mut dyn DecodeSink) -> RawFieldRecord {
    let Some(object) = row.as_object() else {
        return RawFieldRecord::new();
    };

    let mut record = RawFieldRecord::new();
    for (key, value) in object {
        let raw = match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => match n.as_u64() {
                Some(exact) => Some(format!("{exact:#x}")),
                None => {
                    sink.report(
                        key,
                        &DecodeError::InexactNumber {
                            value: n.to_string(),
                        },
                    );
                    wide_integer_hex(n)
                }
            },
            _ => None,
        };
        if let Some(raw) = raw {
            record.insert(key.clone(), raw);
        }
    }
    record
}

fn wide_integer_hex(n: &Number) -> Option<String> {
    let float = n.as_f64()?;
    if !float.is_finite() || float < 0.0 || float.fract() != 0.0 {
        return None;
    }
    BigUint::from_f64(float).map(|value| format!("0x{}", value.to_str_radix(16)))
}

/// Realm level, never below 1. Absent, null, negative or unparsable levels are level 1.
pub fn parse_level(value: Option<&Value>) -> u32 {
    let level = match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(1),
        Some(Value::String(s)) => parse_integer_text(s)
            .and_then(|v| i64::try_from(v).ok())
            .unwrap_or(1),
        _ => 1,
    };
    level.clamp(1, i64::from(u32::MAX)) as u32
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_integer_text(s),
        _ => None,
    }
}

fn parse_integer_text(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        u64::from_str_radix(strip_hex_prefix(trimmed), 16).ok()
    } else {
        trimmed.parse().ok()
    }
}

fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

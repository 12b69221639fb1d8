use crate::models::{AvailableFields, CanonicalField, RawStationRecord};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// A station between normalization and type coercion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationRow {
    /// Canonical columns present on this row, still untyped
    pub values: BTreeMap<CanonicalField, Value>,
    /// Raw nested coordinate structure, if the row carried one
    pub geo_source: Option<Value>,
    pub lat: Option<Value>,
    pub lon: Option<Value>,
}

impl StationRow {
    /// Present and not null
    pub fn value(&self, field: CanonicalField) -> Option<&Value> {
        self.values.get(&field).filter(|v| !v.is_null())
    }
}

/// Rows flowing between stages, together with the negotiated schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationBatch {
    pub fields: AvailableFields,
    pub rows: Vec<StationRow>,
}

impl StationBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct SchemaNormalizer {
    geo_key: String,
}

impl SchemaNormalizer {
    pub fn new(geo_key: &str) -> Self {
        Self {
            geo_key: geo_key.to_string(),
        }
    }

    /// Rename known feed fields to canonical columns and drop everything else.
    ///
    /// A column is available when at least one record carries its source key.
    /// Row order and row count are preserved.
    pub fn normalize(&self, raw: &[RawStationRecord]) -> StationBatch {
        let mut fields = AvailableFields::none();
        let mut dropped_keys: BTreeMap<&str, usize> = BTreeMap::new();

        let rows = raw
            .iter()
            .map(|record| {
                let mut row = StationRow::default();
                for (key, value) in record.iter() {
                    if let Some(field) = CanonicalField::from_source_key(key) {
                        fields.insert(field);
                        row.values.insert(field, value.clone());
                    } else if key == &self.geo_key {
                        row.geo_source = Some(value.clone());
                    } else {
                        *dropped_keys.entry(key.as_str()).or_default() += 1;
                    }
                }
                row
            })
            .collect();

        if !dropped_keys.is_empty() {
            debug!(
                "Dropped {} unrecognised feed fields: {:?}",
                dropped_keys.len(),
                dropped_keys.keys().collect::<Vec<_>>()
            );
        }

        StationBatch { fields, rows }
    }
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new(crate::utils::constants::GEO_KEY)
    }
}

use crate::models::{AvailableFields, CanonicalField, FieldKind, StationAttributes};
use crate::processors::schema_normalizer::StationBatch;
use crate::utils::coordinates::coordinate_from_value;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A typed station whose coordinates have not been validated yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedRow {
    pub attributes: StationAttributes,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedBatch {
    pub fields: AvailableFields,
    pub rows: Vec<CoercedRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercionOutcome {
    /// Values that could not be read as a count and became 0
    pub invalid_counts: BTreeMap<CanonicalField, usize>,
    /// Coordinate members present but not numeric
    pub invalid_coordinates: usize,
}

impl CoercionOutcome {
    pub fn total_invalid_counts(&self) -> usize {
        self.invalid_counts.values().sum()
    }
}

pub struct TypeCoercer;

impl TypeCoercer {
    pub fn new() -> Self {
        Self
    }

    /// Give every available column its canonical type; never fails
    pub fn coerce(&self, batch: StationBatch) -> (CoercedBatch, CoercionOutcome) {
        let mut outcome = CoercionOutcome::default();
        let text_fields = batch.fields.of_kind(FieldKind::Text);
        let count_fields = batch.fields.of_kind(FieldKind::Count);
        let flag_fields = batch.fields.of_kind(FieldKind::Flag);

        let rows = batch
            .rows
            .into_iter()
            .map(|row| {
                let mut attributes = StationAttributes::default();

                for &field in &text_fields {
                    let text = match row.value(field) {
                        Some(Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                        None => String::new(),
                    };
                    attributes.set_text(field, text);
                }

                for &field in &count_fields {
                    let count = match row.value(field).and_then(coerce_count) {
                        Some(count) => count,
                        None => {
                            *outcome.invalid_counts.entry(field).or_default() += 1;
                            0
                        }
                    };
                    attributes.set_count(field, count);
                }

                for &field in &flag_fields {
                    let flag = matches!(row.value(field), Some(Value::Bool(true)));
                    attributes.set_flag(field, flag);
                }

                let lat = coerce_member(row.lat.as_ref(), &mut outcome);
                let lon = coerce_member(row.lon.as_ref(), &mut outcome);

                CoercedRow {
                    attributes,
                    lat,
                    lon,
                }
            })
            .collect();

        let invalid = outcome.total_invalid_counts();
        if invalid > 0 {
            warn!("{} non-numeric or negative counts coerced to 0", invalid);
        }
        debug!(
            "Type coercion: {} invalid coordinate members",
            outcome.invalid_coordinates
        );

        (
            CoercedBatch {
                fields: batch.fields,
                rows,
            },
            outcome,
        )
    }
}

impl Default for TypeCoercer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a station count, truncating fractional values.
///
/// Negative, non-finite, out-of-range and non-numeric values yield `None`.
pub fn coerce_count(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).ok();
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() || number < 0.0 || number.trunc() > u32::MAX as f64 {
        return None;
    }
    Some(number.trunc() as u32)
}

fn coerce_member(value: Option<&Value>, outcome: &mut CoercionOutcome) -> Option<f64> {
    let value = value?;
    match coordinate_from_value(value) {
        Ok(coordinate) => Some(coordinate),
        Err(_) => {
            outcome.invalid_coordinates += 1;
            None
        }
    }
}

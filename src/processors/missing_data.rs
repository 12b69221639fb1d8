use crate::models::{CanonicalField, FieldKind};
use crate::processors::schema_normalizer::StationBatch;
use crate::settings::PipelineConfig;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A text column removed because too many of its values were absent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDrop {
    pub field: CanonicalField,
    /// Share of absent values in [0, 1], measured before any fill
    pub missing_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingDataOutcome {
    pub dropped: Vec<ColumnDrop>,
    /// Absent values replaced by the column default
    pub filled: BTreeMap<CanonicalField, usize>,
    /// Rows normalized to `true`, per status column
    pub flags_set: BTreeMap<CanonicalField, usize>,
}

pub struct MissingDataPolicy {
    threshold: f64,
    fill_text: String,
    yes_token: String,
}

impl MissingDataPolicy {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            threshold: config.missing_threshold,
            fill_text: config.fill_text.clone(),
            yes_token: config.yes_token.clone(),
        }
    }

    /// Apply the per-column rules: drop or fill text, zero-fill counts, close flags
    pub fn apply(&self, mut batch: StationBatch) -> (StationBatch, MissingDataOutcome) {
        let mut outcome = MissingDataOutcome::default();

        for field in batch.fields.of_kind(FieldKind::Text) {
            let ratio = Self::missing_ratio(&batch, field);
            if ratio > self.threshold {
                warn!(
                    "Column '{}' dropped: {:.1}% of values missing",
                    field,
                    ratio * 100.0
                );
                batch.fields.remove(field);
                for row in &mut batch.rows {
                    row.values.remove(&field);
                }
                outcome.dropped.push(ColumnDrop {
                    field,
                    missing_ratio: ratio,
                });
            } else {
                let filled = self.fill_text_column(&mut batch, field);
                outcome.filled.insert(field, filled);
            }
        }

        for field in batch.fields.of_kind(FieldKind::Count) {
            let mut filled = 0;
            for row in &mut batch.rows {
                if row.value(field).is_none() {
                    row.values.insert(field, Value::from(0u32));
                    filled += 1;
                }
            }
            outcome.filled.insert(field, filled);
        }

        for field in batch.fields.of_kind(FieldKind::Flag) {
            let mut filled = 0;
            let mut set = 0;
            for row in &mut batch.rows {
                let flag = match row.value(field) {
                    Some(Value::String(token)) => token == &self.yes_token,
                    Some(_) => false,
                    None => {
                        filled += 1;
                        false
                    }
                };
                if flag {
                    set += 1;
                }
                row.values.insert(field, Value::Bool(flag));
            }
            outcome.filled.insert(field, filled);
            outcome.flags_set.insert(field, set);
        }

        debug!(
            "Missing-data policy: {} columns dropped, fills {:?}",
            outcome.dropped.len(),
            outcome.filled
        );

        (batch, outcome)
    }

    /// Share of rows where the column is missing or null
    pub fn missing_ratio(batch: &StationBatch, field: CanonicalField) -> f64 {
        if batch.rows.is_empty() {
            return 0.0;
        }
        let missing = batch
            .rows
            .iter()
            .filter(|row| row.value(field).is_none())
            .count();
        missing as f64 / batch.rows.len() as f64
    }

    fn fill_text_column(&self, batch: &mut StationBatch, field: CanonicalField) -> usize {
        let mut filled = 0;
        for row in &mut batch.rows {
            let text = match row.value(field) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => {
                    filled += 1;
                    self.fill_text.clone()
                }
            };
            row.values.insert(field, Value::String(text));
        }
        filled
    }
}

impl Default for MissingDataPolicy {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

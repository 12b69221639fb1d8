use crate::processors::schema_normalizer::StationBatch;
use crate::utils::constants::{GEO_LAT_KEY, GEO_LON_KEY};
use serde_json::Value;
use tracing::warn;

/// What coordinate extraction found across the batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeoExtraction {
    /// Rows whose nested structure yielded at least one coordinate member
    pub extracted: usize,
    /// Rows with no coordinate structure at all (key missing or null)
    pub missing: usize,
    /// Rows whose coordinate structure was not an object
    pub malformed: usize,
}

pub struct GeoExtractor;

impl GeoExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Lift `lat`/`lon` out of each row's nested coordinate object.
    ///
    /// Anything other than an object degrades to absent coordinates.
    pub fn extract(&self, mut batch: StationBatch) -> (StationBatch, GeoExtraction) {
        let mut outcome = GeoExtraction::default();

        for row in &mut batch.rows {
            match row.geo_source.take() {
                Some(Value::Object(coords)) => {
                    row.lat = coords.get(GEO_LAT_KEY).filter(|v| !v.is_null()).cloned();
                    row.lon = coords.get(GEO_LON_KEY).filter(|v| !v.is_null()).cloned();
                    if row.lat.is_some() || row.lon.is_some() {
                        outcome.extracted += 1;
                    } else {
                        outcome.missing += 1;
                    }
                }
                None | Some(Value::Null) => {
                    row.lat = None;
                    row.lon = None;
                    outcome.missing += 1;
                }
                Some(_) => {
                    row.lat = None;
                    row.lon = None;
                    outcome.malformed += 1;
                }
            }
        }

        if outcome.malformed > 0 {
            warn!(
                "{} stations carry a malformed coordinate structure; their coordinates are treated as absent",
                outcome.malformed
            );
        }

        (batch, outcome)
    }
}

impl Default for GeoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

use crate::models::{CanonicalStationRecord, StationDataset};
use crate::processors::type_coercer::CoercedBatch;
use crate::utils::coordinates::is_placeable;
use tracing::debug;

/// Removes stations that cannot be placed on a map.
///
/// There is no default coordinate: a station without finite `lat`/`lon`
/// is excluded rather than plotted at a false location.
pub struct GeoValidator;

impl GeoValidator {
    pub fn new() -> Self {
        Self
    }

    /// Returns the placeable stations and how many rows were removed
    pub fn validate(&self, batch: CoercedBatch) -> (StationDataset, usize) {
        let total = batch.rows.len();

        let records: Vec<CanonicalStationRecord> = batch
            .rows
            .into_iter()
            .filter_map(|row| match (row.lat, row.lon) {
                (Some(lat), Some(lon)) if is_placeable(Some(lat), Some(lon)) => {
                    Some(CanonicalStationRecord::new(row.attributes, lat, lon))
                }
                _ => None,
            })
            .collect();

        let removed = total - records.len();
        debug!("Coordinate validation removed {} of {} rows", removed, total);

        (StationDataset::new(batch.fields, records), removed)
    }
}

impl Default for GeoValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AvailableFields;
    use crate::processors::type_coercer::CoercedRow;

    fn row(lat: Option<f64>, lon: Option<f64>) -> CoercedRow {
        CoercedRow {
            lat,
            lon,
            ..Default::default()
        }
    }

    #[test]
    fn test_removes_unplaceable_rows() {
        let batch = CoercedBatch {
            fields: AvailableFields::none(),
            rows: vec![
                row(Some(48.8), Some(2.3)),
                row(None, Some(2.3)),
                row(Some(48.8), None),
                row(Some(f64::NAN), Some(2.3)),
                row(Some(48.9), Some(f64::NEG_INFINITY)),
                row(Some(0.0), Some(0.0)),
            ],
        };

        let (dataset, removed) = GeoValidator::new().validate(batch);

        assert_eq!(removed, 4);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].lat, 48.8);
        assert_eq!(dataset.records()[1].lon, 0.0);
    }
}

use crate::models::{CanonicalField, StationDataset};
use tracing::debug;

const STATUS_FIELDS: [CanonicalField; 2] =
    [CanonicalField::LocationPossible, CanonicalField::RetourPossible];

/// Keeps stations that rent or accept bikes.
///
/// Only the status columns available this run take part; with none
/// available every station is kept.
pub struct OperationalStatusFilter;

impl OperationalStatusFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn filter(&self, dataset: StationDataset) -> (StationDataset, usize) {
        let criteria: Vec<CanonicalField> = STATUS_FIELDS
            .into_iter()
            .filter(|f| dataset.fields().contains(*f))
            .collect();

        if criteria.is_empty() {
            debug!("No status column available; operational filter skipped");
            return (dataset, 0);
        }

        let total = dataset.len();
        let (fields, records) = dataset.into_parts();
        let records: Vec<_> = records
            .into_iter()
            .filter(|record| {
                criteria
                    .iter()
                    .any(|f| record.attributes.flag(*f).unwrap_or(false))
            })
            .collect();

        let removed = total - records.len();
        debug!(
            "Operational filter on {:?} removed {} of {} rows",
            criteria, removed, total
        );

        (StationDataset::new(fields, records), removed)
    }
}

impl Default for OperationalStatusFilter {
    fn default() -> Self {
        Self::new()
    }
}

use crate::models::{CanonicalField, StationDataset};
use crate::utils::constants::{MAX_AVAILABILITY, MIN_AVAILABILITY};
use serde::Serialize;
use tracing::{debug, warn};

const RATIO_INPUTS: [CanonicalField; 2] =
    [CanonicalField::CapaciteTotal, CanonicalField::VelosDispoTotal];

/// Whether `TauxDispo` reflects real data for this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatioFidelity {
    Full,
    /// The named input columns were unavailable; every ratio is 0
    Reduced { missing: Vec<CanonicalField> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsOutcome {
    pub fidelity: RatioFidelity,
    /// Stations with zero declared capacity, reported at 0%
    pub zero_capacity: usize,
    /// Stations reporting more bikes than capacity, capped at 100%
    pub clamped: usize,
}

impl Default for MetricsOutcome {
    fn default() -> Self {
        Self {
            fidelity: RatioFidelity::Full,
            zero_capacity: 0,
            clamped: 0,
        }
    }
}

pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Availability ratio for one station, in percent
    pub fn availability_ratio(bikes: u32, capacity: u32) -> f64 {
        if capacity == 0 {
            return 0.0;
        }
        (bikes as f64 / capacity as f64 * 100.0).clamp(MIN_AVAILABILITY, MAX_AVAILABILITY)
    }

    pub fn compute(&self, dataset: StationDataset) -> (StationDataset, MetricsOutcome) {
        let (fields, records) = dataset.into_parts();
        let mut outcome = MetricsOutcome::default();

        let missing: Vec<CanonicalField> = RATIO_INPUTS
            .into_iter()
            .filter(|f| !fields.contains(*f))
            .collect();

        let records = if missing.is_empty() {
            records
                .into_iter()
                .map(|record| {
                    let capacity = record.attributes.capacite_total.unwrap_or(0);
                    let bikes = record.attributes.velos_dispo_total.unwrap_or(0);
                    if capacity == 0 {
                        outcome.zero_capacity += 1;
                    } else if bikes > capacity {
                        outcome.clamped += 1;
                    }
                    record.with_taux_dispo(Self::availability_ratio(bikes, capacity))
                })
                .collect()
        } else {
            warn!(
                "Availability ratio unavailable (missing {:?}); TauxDispo set to 0",
                missing
            );
            outcome.fidelity = RatioFidelity::Reduced { missing };
            records
                .into_iter()
                .map(|record| record.with_taux_dispo(0.0))
                .collect()
        };

        debug!(
            "Metrics: {} zero-capacity stations, {} ratios capped",
            outcome.zero_capacity, outcome.clamped
        );

        (StationDataset::new(fields, records), outcome)
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

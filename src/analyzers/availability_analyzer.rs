use crate::models::{
    AvailabilityBand, CanonicalField, CanonicalStationRecord, StationDataset,
};
use crate::utils::constants::DEFAULT_COMMUNE_RANKING_SIZE;
use clap::ValueEnum;
use geo::{BoundingRect, MultiPoint};
use serde::Serialize;
use std::collections::BTreeMap;

/// Which kind of bike the rider is after
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
pub enum BikeType {
    #[default]
    Any,
    Mechanical,
    Electric,
}

/// Dashboard-style selection over a cleaned dataset.
///
/// A criterion whose column is not available this run is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationQuery {
    commune: Option<String>,
    min_bikes: u32,
    bike_type: BikeType,
}

impl StationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commune(mut self, commune: Option<String>) -> Self {
        self.commune = commune;
        self
    }

    pub fn with_min_bikes(mut self, min_bikes: u32) -> Self {
        self.min_bikes = min_bikes;
        self
    }

    pub fn with_bike_type(mut self, bike_type: BikeType) -> Self {
        self.bike_type = bike_type;
        self
    }

    pub fn commune(&self) -> Option<&str> {
        self.commune.as_deref()
    }

    pub fn min_bikes(&self) -> u32 {
        self.min_bikes
    }

    pub fn bike_type(&self) -> BikeType {
        self.bike_type
    }

    /// 1 when any station has a bike to rent, else 0
    pub fn default_min_bikes(dataset: &StationDataset) -> u32 {
        let any_bikes = dataset.iter().any(|r| r.bikes_available().unwrap_or(0) >= 1);
        u32::from(any_bikes)
    }

    pub fn apply(&self, dataset: &StationDataset) -> StationDataset {
        let fields = dataset.fields();
        let commune = self
            .commune
            .as_deref()
            .filter(|_| fields.contains(CanonicalField::Commune));
        let by_bikes = fields.contains(CanonicalField::VelosDispoTotal);
        let type_field = match self.bike_type {
            BikeType::Any => None,
            BikeType::Mechanical => Some(CanonicalField::VelosMecaniques),
            BikeType::Electric => Some(CanonicalField::VelosElectriques),
        }
        .filter(|f| fields.contains(*f));

        dataset.retain(|record| {
            if commune.is_some() && record.commune() != commune {
                return false;
            }
            if by_bikes && record.bikes_available().unwrap_or(0) < self.min_bikes {
                return false;
            }
            if let Some(field) = type_field {
                if record.attributes.count(field).unwrap_or(0) == 0 {
                    return false;
                }
            }
            true
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeographicBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilitySummary {
    pub station_count: usize,
    pub total_bikes: u64,
    /// Mean TauxDispo; `None` for an empty selection
    pub mean_availability: Option<f64>,
    pub band_counts: BTreeMap<AvailabilityBand, usize>,
    pub bounds: Option<GeographicBounds>,
}

impl AvailabilitySummary {
    pub fn summary(&self) -> String {
        let mean = self
            .mean_availability
            .map(|m| format!("{:.1}%", m))
            .unwrap_or_else(|| "N/A".to_string());

        let mut summary = format!(
            "Stations: {}\nAvailable bikes: {}\nMean availability: {}\n",
            self.station_count, self.total_bikes, mean
        );

        for (band, count) in &self.band_counts {
            summary.push_str(&format!("  {:?} ({}): {}\n", band, band.colour(), count));
        }

        if let Some(b) = &self.bounds {
            summary.push_str(&format!(
                "Bounds: lat [{:.4}, {:.4}], lon [{:.4}, {:.4}]\n",
                b.min_lat, b.max_lat, b.min_lon, b.max_lon
            ));
        }

        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommuneAvailability {
    pub commune: String,
    pub station_count: usize,
    pub mean_availability: f64,
}

pub struct AvailabilityAnalyzer;

impl AvailabilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, dataset: &StationDataset) -> AvailabilitySummary {
        let station_count = dataset.len();
        let total_bikes = dataset
            .iter()
            .map(|r| r.bikes_available().unwrap_or(0) as u64)
            .sum();

        let mean_availability = if station_count == 0 {
            None
        } else {
            Some(dataset.iter().map(|r| r.taux_dispo).sum::<f64>() / station_count as f64)
        };

        let mut band_counts = BTreeMap::new();
        for record in dataset {
            *band_counts.entry(record.availability_band()).or_insert(0) += 1;
        }

        let points: MultiPoint<f64> = dataset.iter().map(|r| r.point()).collect();
        let bounds = points.bounding_rect().map(|rect| GeographicBounds {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lon: rect.min().x,
            max_lon: rect.max().x,
        });

        AvailabilitySummary {
            station_count,
            total_bikes,
            mean_availability,
            band_counts,
            bounds,
        }
    }

    /// Communes by mean availability, best first; empty without a Commune column
    pub fn commune_ranking(
        &self,
        dataset: &StationDataset,
        top_n: usize,
    ) -> Vec<CommuneAvailability> {
        if !dataset.fields().contains(CanonicalField::Commune) {
            return Vec::new();
        }

        let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for record in dataset {
            if let Some(commune) = record.commune() {
                let entry = groups.entry(commune).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += record.taux_dispo;
            }
        }

        let mut ranking: Vec<CommuneAvailability> = groups
            .into_iter()
            .map(|(commune, (count, total))| CommuneAvailability {
                commune: commune.to_string(),
                station_count: count,
                mean_availability: total / count as f64,
            })
            .collect();

        // Stable sort keeps alphabetical order among ties
        ranking.sort_by(|a, b| b.mean_availability.total_cmp(&a.mean_availability));
        ranking.truncate(top_n);
        ranking
    }

    /// Stations by TauxDispo, best first; ties keep dataset order
    pub fn station_ranking<'a>(
        &self,
        dataset: &'a StationDataset,
        top_n: usize,
    ) -> Vec<&'a CanonicalStationRecord> {
        let mut ranking: Vec<&CanonicalStationRecord> = dataset.iter().collect();
        ranking.sort_by(|a, b| b.taux_dispo.total_cmp(&a.taux_dispo));
        ranking.truncate(top_n);
        ranking
    }

    pub fn default_ranking(&self, dataset: &StationDataset) -> Vec<CommuneAvailability> {
        self.commune_ranking(dataset, DEFAULT_COMMUNE_RANKING_SIZE)
    }
}

impl Default for AvailabilityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

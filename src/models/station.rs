use crate::models::schema::CanonicalField;
use crate::utils::constants::{
    COLOUR_GOOD, COLOUR_LOW, COLOUR_MEDIUM, LOW_AVAILABILITY_BELOW, MEDIUM_AVAILABILITY_BELOW,
};
use geo::Point;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Canonical columns of a station; `None` when the column is not available this run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationAttributes {
    #[serde(rename = "NomStation", default, skip_serializing_if = "Option::is_none")]
    pub nom_station: Option<String>,

    #[serde(rename = "Commune", default, skip_serializing_if = "Option::is_none")]
    pub commune: Option<String>,

    #[serde(rename = "CapaciteTotal", default, skip_serializing_if = "Option::is_none")]
    pub capacite_total: Option<u32>,

    #[serde(rename = "BornesLibres", default, skip_serializing_if = "Option::is_none")]
    pub bornes_libres: Option<u32>,

    #[serde(rename = "VelosDispoTotal", default, skip_serializing_if = "Option::is_none")]
    pub velos_dispo_total: Option<u32>,

    #[serde(rename = "VelosMecaniques", default, skip_serializing_if = "Option::is_none")]
    pub velos_mecaniques: Option<u32>,

    #[serde(rename = "VelosElectriques", default, skip_serializing_if = "Option::is_none")]
    pub velos_electriques: Option<u32>,

    #[serde(rename = "LocationPossible", default, skip_serializing_if = "Option::is_none")]
    pub location_possible: Option<bool>,

    #[serde(rename = "RetourPossible", default, skip_serializing_if = "Option::is_none")]
    pub retour_possible: Option<bool>,
}

impl StationAttributes {
    pub fn text(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::NomStation => self.nom_station.as_deref(),
            CanonicalField::Commune => self.commune.as_deref(),
            _ => None,
        }
    }

    pub fn count(&self, field: CanonicalField) -> Option<u32> {
        match field {
            CanonicalField::CapaciteTotal => self.capacite_total,
            CanonicalField::BornesLibres => self.bornes_libres,
            CanonicalField::VelosDispoTotal => self.velos_dispo_total,
            CanonicalField::VelosMecaniques => self.velos_mecaniques,
            CanonicalField::VelosElectriques => self.velos_electriques,
            _ => None,
        }
    }

    pub fn flag(&self, field: CanonicalField) -> Option<bool> {
        match field {
            CanonicalField::LocationPossible => self.location_possible,
            CanonicalField::RetourPossible => self.retour_possible,
            _ => None,
        }
    }

    pub fn set_text(&mut self, field: CanonicalField, value: String) {
        match field {
            CanonicalField::NomStation => self.nom_station = Some(value),
            CanonicalField::Commune => self.commune = Some(value),
            _ => {}
        }
    }

    pub fn set_count(&mut self, field: CanonicalField, value: u32) {
        match field {
            CanonicalField::CapaciteTotal => self.capacite_total = Some(value),
            CanonicalField::BornesLibres => self.bornes_libres = Some(value),
            CanonicalField::VelosDispoTotal => self.velos_dispo_total = Some(value),
            CanonicalField::VelosMecaniques => self.velos_mecaniques = Some(value),
            CanonicalField::VelosElectriques => self.velos_electriques = Some(value),
            _ => {}
        }
    }

    pub fn set_flag(&mut self, field: CanonicalField, value: bool) {
        match field {
            CanonicalField::LocationPossible => self.location_possible = Some(value),
            CanonicalField::RetourPossible => self.retour_possible = Some(value),
            _ => {}
        }
    }
}

/// A cleaned station: canonical attributes, a placeable position and its availability ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CanonicalStationRecord {
    #[serde(flatten)]
    pub attributes: StationAttributes,

    pub lat: f64,

    pub lon: f64,

    #[serde(rename = "TauxDispo")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub taux_dispo: f64,
}

impl CanonicalStationRecord {
    /// Availability starts at 0 until metrics are computed
    pub fn new(attributes: StationAttributes, lat: f64, lon: f64) -> Self {
        Self {
            attributes,
            lat,
            lon,
            taux_dispo: 0.0,
        }
    }

    pub fn with_taux_dispo(mut self, taux_dispo: f64) -> Self {
        self.taux_dispo = taux_dispo;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.nom_station.as_deref()
    }

    pub fn commune(&self) -> Option<&str> {
        self.attributes.commune.as_deref()
    }

    pub fn bikes_available(&self) -> Option<u32> {
        self.attributes.velos_dispo_total
    }

    /// Point geometry, x = longitude, y = latitude (EPSG:4326)
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    pub fn availability_band(&self) -> AvailabilityBand {
        AvailabilityBand::from_ratio(self.taux_dispo)
    }
}

/// Coarse availability classes used to colour stations on a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AvailabilityBand {
    /// Below 10%
    Low,
    /// Below 30%
    Medium,
    /// 30% and above
    Good,
}

impl AvailabilityBand {
    pub fn from_ratio(taux_dispo: f64) -> Self {
        if taux_dispo < LOW_AVAILABILITY_BELOW {
            AvailabilityBand::Low
        } else if taux_dispo < MEDIUM_AVAILABILITY_BELOW {
            AvailabilityBand::Medium
        } else {
            AvailabilityBand::Good
        }
    }

    pub fn colour(self) -> &'static str {
        match self {
            AvailabilityBand::Low => COLOUR_LOW,
            AvailabilityBand::Medium => COLOUR_MEDIUM,
            AvailabilityBand::Good => COLOUR_GOOD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> CanonicalStationRecord {
        let attributes = StationAttributes {
            nom_station: Some("Bastille".to_string()),
            capacite_total: Some(40),
            velos_dispo_total: Some(10),
            location_possible: Some(true),
            ..Default::default()
        };
        CanonicalStationRecord::new(attributes, 48.853, 2.369).with_taux_dispo(25.0)
    }

    #[test]
    fn test_serializes_only_available_columns() {
        let value = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(
            value,
            json!({
                "NomStation": "Bastille",
                "CapaciteTotal": 40,
                "VelosDispoTotal": 10,
                "LocationPossible": true,
                "lat": 48.853,
                "lon": 2.369,
                "TauxDispo": 25.0
            })
        );
    }

    #[test]
    fn test_taux_dispo_validation() {
        assert!(sample_record().validate().is_ok());
        assert!(sample_record().with_taux_dispo(120.0).validate().is_err());
    }

    #[test]
    fn test_point_axis_order() {
        let point = sample_record().point();
        assert_eq!(point.x(), 2.369);
        assert_eq!(point.y(), 48.853);
    }

    #[test]
    fn test_accessors() {
        let mut attributes = StationAttributes::default();
        attributes.set_text(CanonicalField::Commune, "Paris".to_string());
        attributes.set_count(CanonicalField::VelosElectriques, 3);
        attributes.set_flag(CanonicalField::RetourPossible, false);

        assert_eq!(attributes.text(CanonicalField::Commune), Some("Paris"));
        assert_eq!(attributes.count(CanonicalField::VelosElectriques), Some(3));
        assert_eq!(attributes.flag(CanonicalField::RetourPossible), Some(false));
        assert_eq!(attributes.count(CanonicalField::Commune), None);
    }

    #[test]
    fn test_availability_bands() {
        assert_eq!(AvailabilityBand::from_ratio(0.0), AvailabilityBand::Low);
        assert_eq!(AvailabilityBand::from_ratio(9.9), AvailabilityBand::Low);
        assert_eq!(AvailabilityBand::from_ratio(10.0), AvailabilityBand::Medium);
        assert_eq!(AvailabilityBand::from_ratio(29.9), AvailabilityBand::Medium);
        assert_eq!(AvailabilityBand::from_ratio(30.0), AvailabilityBand::Good);
        assert_eq!(AvailabilityBand::Good.colour(), "#008000");
    }
}

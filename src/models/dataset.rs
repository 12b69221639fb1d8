use crate::models::schema::AvailableFields;
use crate::models::station::CanonicalStationRecord;
use crate::utils::constants::WGS84_EPSG;
use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use serde::Serialize;

/// The cleaned snapshot: the negotiated columns and the surviving stations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationDataset {
    fields: AvailableFields,
    records: Vec<CanonicalStationRecord>,
}

/// A station paired with its point geometry, for map collaborators
#[derive(Debug, Clone, Copy)]
pub struct GeoStation<'a> {
    pub record: &'a CanonicalStationRecord,
    pub geometry: Point<f64>,
}

impl StationDataset {
    pub fn new(fields: AvailableFields, records: Vec<CanonicalStationRecord>) -> Self {
        Self { fields, records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &AvailableFields {
        &self.fields
    }

    pub fn records(&self) -> &[CanonicalStationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalStationRecord> {
        self.records.iter()
    }

    pub fn into_parts(self) -> (AvailableFields, Vec<CanonicalStationRecord>) {
        (self.fields, self.records)
    }

    /// Same schema, subset of stations
    pub fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&CanonicalStationRecord) -> bool,
    {
        Self {
            fields: self.fields.clone(),
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Distinct communes in sorted order; empty when the column is not available
    pub fn communes(&self) -> Vec<String> {
        let mut communes: Vec<String> = self
            .records
            .iter()
            .filter_map(|r| r.commune().map(str::to_string))
            .collect();
        communes.sort();
        communes.dedup();
        communes
    }

    /// Geometry-augmented view, derived on demand
    pub fn geo_view(&self) -> impl Iterator<Item = GeoStation<'_>> {
        self.records.iter().map(|record| GeoStation {
            record,
            geometry: record.point(),
        })
    }

    /// GeoJSON rendering of the geometry view, one point feature per station
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .geo_view()
            .map(|station| {
                let properties = match serde_json::to_value(station.record) {
                    Ok(JsonValue::Object(map)) => map,
                    _ => JsonObject::new(),
                };
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(geojson::Value::from(&station.geometry))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let mut crs = JsonObject::new();
        crs.insert(
            "crs".to_string(),
            serde_json::json!({
                "type": "name",
                "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", WGS84_EPSG) }
            }),
        );

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(crs),
        }
    }
}

impl<'a> IntoIterator for &'a StationDataset {
    type Item = &'a CanonicalStationRecord;
    type IntoIter = std::slice::Iter<'a, CanonicalStationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

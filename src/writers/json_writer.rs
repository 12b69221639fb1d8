use crate::error::Result;
use crate::models::StationDataset;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pretty-printed JSON export, used for the quality report
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// GeoJSON FeatureCollection of the cleaned stations
pub fn write_geojson(dataset: &StationDataset, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &dataset.to_feature_collection())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvailableFields, CanonicalStationRecord, StationAttributes};
    use geojson::GeoJson;
    use tempfile::NamedTempFile;

    #[test]
    fn test_geojson_file_parses_back() {
        let dataset = StationDataset::new(
            AvailableFields::none(),
            vec![
                CanonicalStationRecord::new(StationAttributes::default(), 48.85, 2.35),
                CanonicalStationRecord::new(StationAttributes::default(), 48.86, 2.36),
            ],
        );
        let temp_file = NamedTempFile::new().unwrap();

        write_geojson(&dataset, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        match content.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(collection) => assert_eq!(collection.features.len(), 2),
            other => panic!("expected a FeatureCollection, got {:?}", other),
        }
    }

    #[test]
    fn test_write_json() {
        let temp_file = NamedTempFile::new().unwrap();
        write_json(&serde_json::json!({"clean_rows": 3}), temp_file.path()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(temp_file.path()).unwrap()).unwrap();
        assert_eq!(value["clean_rows"], 3);
    }
}

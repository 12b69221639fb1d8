use crate::error::Result;
use crate::models::{CanonicalStationRecord, FieldKind, StationDataset};
use crate::utils::constants::{LAT_COLUMN, LON_COLUMN, TAUX_DISPO_COLUMN};
use std::io::Write;
use std::path::Path;

/// Flat export of the cleaned snapshot; one column per available field
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write_dataset(&self, dataset: &StationDataset, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(dataset, file)
    }

    pub fn write_to<W: Write>(&self, dataset: &StationDataset, sink: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(sink);

        let mut header: Vec<&str> = dataset.fields().iter().map(|f| f.name()).collect();
        header.extend([LAT_COLUMN, LON_COLUMN, TAUX_DISPO_COLUMN]);
        writer.write_record(&header)?;

        for record in dataset {
            writer.write_record(Self::row(dataset, record))?;
        }

        writer.flush()?;
        Ok(())
    }

    fn row(dataset: &StationDataset, record: &CanonicalStationRecord) -> Vec<String> {
        let mut row: Vec<String> = dataset
            .fields()
            .iter()
            .map(|field| match field.kind() {
                FieldKind::Text => record.attributes.text(field).unwrap_or_default().to_string(),
                FieldKind::Count => record
                    .attributes
                    .count(field)
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                FieldKind::Flag => record
                    .attributes
                    .flag(field)
                    .map(|b| b.to_string())
                    .unwrap_or_default(),
            })
            .collect();

        row.push(record.lat.to_string());
        row.push(record.lon.to_string());
        row.push(record.taux_dispo.to_string());
        row
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

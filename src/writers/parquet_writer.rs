use crate::error::{ProcessingError, Result};
use crate::models::{
    AvailableFields, CanonicalField, CanonicalStationRecord, FieldKind, StationAttributes,
    StationDataset,
};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE, LAT_COLUMN, LON_COLUMN, TAUX_DISPO_COLUMN,
};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

enum AttributeColumn<'a> {
    Text(CanonicalField, &'a StringArray),
    Count(CanonicalField, &'a UInt32Array),
    Flag(CanonicalField, &'a BooleanArray),
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write the cleaned snapshot; only available columns are stored
    pub fn write_dataset(&self, dataset: &StationDataset, path: &Path) -> Result<()> {
        if dataset.is_empty() {
            return Ok(());
        }

        let schema = Self::create_schema(dataset.fields());
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in dataset.records().chunks(self.row_group_size.max(1)) {
            let batch = Self::records_to_batch(dataset.fields(), chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Arrow schema: available canonical columns, then coordinates and ratio
    fn create_schema(fields: &AvailableFields) -> Arc<Schema> {
        let mut columns: Vec<Field> = fields
            .iter()
            .map(|field| {
                let data_type = match field.kind() {
                    FieldKind::Text => DataType::Utf8,
                    FieldKind::Count => DataType::UInt32,
                    FieldKind::Flag => DataType::Boolean,
                };
                Field::new(field.name(), data_type, true)
            })
            .collect();

        columns.push(Field::new(LAT_COLUMN, DataType::Float64, false));
        columns.push(Field::new(LON_COLUMN, DataType::Float64, false));
        columns.push(Field::new(TAUX_DISPO_COLUMN, DataType::Float64, false));

        Arc::new(Schema::new(columns))
    }

    fn records_to_batch(
        fields: &AvailableFields,
        records: &[CanonicalStationRecord],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = fields
            .iter()
            .map(|field| -> ArrayRef {
                match field.kind() {
                    FieldKind::Text => Arc::new(StringArray::from(
                        records
                            .iter()
                            .map(|r| r.attributes.text(field))
                            .collect::<Vec<_>>(),
                    )),
                    FieldKind::Count => Arc::new(UInt32Array::from(
                        records
                            .iter()
                            .map(|r| r.attributes.count(field))
                            .collect::<Vec<_>>(),
                    )),
                    FieldKind::Flag => Arc::new(BooleanArray::from(
                        records
                            .iter()
                            .map(|r| r.attributes.flag(field))
                            .collect::<Vec<_>>(),
                    )),
                }
            })
            .collect();

        let lats: Vec<f64> = records.iter().map(|r| r.lat).collect();
        let lons: Vec<f64> = records.iter().map(|r| r.lon).collect();
        let ratios: Vec<f64> = records.iter().map(|r| r.taux_dispo).collect();
        columns.push(Arc::new(Float64Array::from(lats)));
        columns.push(Arc::new(Float64Array::from(lons)));
        columns.push(Arc::new(Float64Array::from(ratios)));

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Read a snapshot back; `limit == 0` reads every row
    pub fn read_dataset(&self, path: &Path, limit: usize) -> Result<StationDataset> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let fields: AvailableFields = builder
            .schema()
            .fields()
            .iter()
            .filter_map(|f| CanonicalField::from_name(f.name()))
            .collect();
        let reader = builder.build()?;

        let mut records = Vec::new();

        'batches: for batch_result in reader {
            let batch = batch_result?;

            let attribute_columns = fields
                .iter()
                .map(|field| {
                    Ok(match field.kind() {
                        FieldKind::Text => {
                            AttributeColumn::Text(field, column(&batch, field.name())?)
                        }
                        FieldKind::Count => {
                            AttributeColumn::Count(field, column(&batch, field.name())?)
                        }
                        FieldKind::Flag => {
                            AttributeColumn::Flag(field, column(&batch, field.name())?)
                        }
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let lats: &Float64Array = column(&batch, LAT_COLUMN)?;
            let lons: &Float64Array = column(&batch, LON_COLUMN)?;
            let ratios: &Float64Array = column(&batch, TAUX_DISPO_COLUMN)?;

            for i in 0..batch.num_rows() {
                let mut attributes = StationAttributes::default();
                for attribute in &attribute_columns {
                    match attribute {
                        AttributeColumn::Text(field, array) if !array.is_null(i) => {
                            attributes.set_text(*field, array.value(i).to_string())
                        }
                        AttributeColumn::Count(field, array) if !array.is_null(i) => {
                            attributes.set_count(*field, array.value(i))
                        }
                        AttributeColumn::Flag(field, array) if !array.is_null(i) => {
                            attributes.set_flag(*field, array.value(i))
                        }
                        _ => {}
                    }
                }

                records.push(
                    CanonicalStationRecord::new(attributes, lats.value(i), lons.value(i))
                        .with_taux_dispo(ratios.value(i)),
                );

                if limit > 0 && records.len() >= limit {
                    break 'batches;
                }
            }
        }

        Ok(StationDataset::new(fields, records))
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let mut row_group_sizes = Vec::new();
        for i in 0..row_groups {
            let rg_metadata = metadata.row_group(i);
            row_group_sizes.push(rg_metadata.num_rows());
        }

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("Invalid or missing {} column", name))
        })
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_dataset() -> StationDataset {
        let fields: AvailableFields = [
            CanonicalField::NomStation,
            CanonicalField::CapaciteTotal,
            CanonicalField::VelosDispoTotal,
            CanonicalField::LocationPossible,
        ]
        .into_iter()
        .collect();

        let attributes = StationAttributes {
            nom_station: Some("Bastille".to_string()),
            capacite_total: Some(40),
            velos_dispo_total: Some(10),
            location_possible: Some(true),
            ..Default::default()
        };

        StationDataset::new(
            fields,
            vec![CanonicalStationRecord::new(attributes, 48.853, 2.369).with_taux_dispo(25.0)],
        )
    }

    #[test]
    fn test_write_empty_dataset() {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        let result = writer.write_dataset(&StationDataset::empty(), temp_file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;
        let dataset = sample_dataset();

        writer.write_dataset(&dataset, temp_file.path())?;
        let read_back = writer.read_dataset(temp_file.path(), 0)?;

        assert_eq!(read_back, dataset);

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 1);
        assert!(info.summary().contains("Total rows: 1"));

        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_dataset(&sample_dataset(), temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-ish").is_err());
        Ok(())
    }
}

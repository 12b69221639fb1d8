pub mod csv_writer;
pub mod json_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use json_writer::{write_geojson, write_json};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};

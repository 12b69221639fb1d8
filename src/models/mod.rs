pub mod dataset;
pub mod raw;
pub mod schema;
pub mod station;

pub use dataset::{GeoStation, StationDataset};
pub use raw::RawStationRecord;
pub use schema::{AvailableFields, CanonicalField, FieldKind};
pub use station::{AvailabilityBand, CanonicalStationRecord, StationAttributes};

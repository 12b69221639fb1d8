pub mod geo_extractor;
pub mod geo_validator;
pub mod metrics_calculator;
pub mod missing_data;
pub mod pipeline;
pub mod quality_reporter;
pub mod schema_normalizer;
pub mod status_filter;
pub mod type_coercer;

pub use geo_extractor::{GeoExtraction, GeoExtractor};
pub use geo_validator::GeoValidator;
pub use metrics_calculator::{MetricsCalculator, MetricsOutcome, RatioFidelity};
pub use missing_data::{ColumnDrop, MissingDataOutcome, MissingDataPolicy};
pub use pipeline::{CleaningPipeline, PipelineOutput};
pub use quality_reporter::{
    DataQualityReport, NoteLevel, QualityNote, QualityReporter, RunObservations, RunStatus,
};
pub use schema_normalizer::{SchemaNormalizer, StationBatch, StationRow};
pub use status_filter::OperationalStatusFilter;
pub use type_coercer::{CoercedBatch, CoercedRow, CoercionOutcome, TypeCoercer};

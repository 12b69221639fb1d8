use crate::models::{RawStationRecord, StationDataset};
use crate::processors::geo_extractor::GeoExtractor;
use crate::processors::geo_validator::GeoValidator;
use crate::processors::metrics_calculator::MetricsCalculator;
use crate::processors::missing_data::MissingDataPolicy;
use crate::processors::quality_reporter::{DataQualityReport, QualityReporter, RunObservations};
use crate::processors::schema_normalizer::SchemaNormalizer;
use crate::processors::status_filter::OperationalStatusFilter;
use crate::processors::type_coercer::TypeCoercer;
use crate::readers::{FeedCache, FeedSource};
use crate::settings::PipelineConfig;
use tracing::{info, warn};

/// The two artifacts handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub dataset: StationDataset,
    pub report: DataQualityReport,
}

impl PipelineOutput {
    pub fn is_usable(&self) -> bool {
        !self.dataset.is_empty()
    }
}

/// Runs the cleaning stages in their fixed order.
///
/// A run is a pure function of the raw batch and the configuration; the
/// pipeline holds no state between runs.
pub struct CleaningPipeline {
    config: PipelineConfig,
}

impl CleaningPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, raw: &[RawStationRecord]) -> PipelineOutput {
        let reporter = QualityReporter::new();

        if raw.is_empty() {
            warn!("Raw feed is empty; nothing to clean");
            return PipelineOutput {
                dataset: StationDataset::empty(),
                report: reporter.no_input("the raw feed contains no station records"),
            };
        }

        let mut observations = RunObservations {
            raw_rows: raw.len(),
            ..Default::default()
        };

        let batch = SchemaNormalizer::new(&self.config.geo_key).normalize(raw);

        let (batch, geo) = GeoExtractor::new().extract(batch);
        observations.geo = geo;

        let (batch, missing) = MissingDataPolicy::new(&self.config).apply(batch);
        observations.missing = missing;

        let (batch, coercion) = TypeCoercer::new().coerce(batch);
        observations.coercion = coercion;

        let (dataset, removed) = GeoValidator::new().validate(batch);
        observations.rows_without_coordinates = removed;

        let (dataset, removed) = OperationalStatusFilter::new().filter(dataset);
        observations.rows_not_operational = removed;

        let (dataset, metrics) = MetricsCalculator::new().compute(dataset);
        observations.metrics = metrics;

        let report = reporter.report(observations, &dataset);
        info!(
            "Cleaned {} of {} stations",
            report.clean_rows(),
            report.raw_rows()
        );

        PipelineOutput { dataset, report }
    }

    /// Fetch from a feed and clean it; ingestion failures become an empty result
    pub fn run_source<S: FeedSource + ?Sized>(&self, source: &S) -> PipelineOutput {
        match source.fetch() {
            Ok(raw) => self.run(&raw),
            Err(e) => self.no_input(&e.to_string()),
        }
    }

    /// Clean the cached batch, fetching it first if the cache is cold
    pub fn run_cached<S: FeedSource>(&self, cache: &mut FeedCache<S>) -> PipelineOutput {
        match cache.get() {
            Ok(raw) => self.run(raw),
            Err(e) => self.no_input(&e.to_string()),
        }
    }

    fn no_input(&self, reason: &str) -> PipelineOutput {
        warn!("No usable input: {}", reason);
        PipelineOutput {
            dataset: StationDataset::empty(),
            report: QualityReporter::new().no_input(reason),
        }
    }
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalField;
    use crate::processors::quality_reporter::RunStatus;
    use crate::readers::InMemoryFeed;
    use serde_json::{json, Value};

    fn raw(values: Vec<Value>) -> Vec<RawStationRecord> {
        values
            .into_iter()
            .filter_map(RawStationRecord::from_value)
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let batch = raw(vec![
            json!({"name": "A", "capacity": 10, "numbikesavailable": 5, "is_renting": "OUI",
                   "coordonnees_geo": {"lat": 48.8, "lon": 2.3}}),
            json!({"name": "B", "capacity": 0, "numbikesavailable": 0, "is_renting": "OUI",
                   "coordonnees_geo": {"lat": 48.9, "lon": 2.4}}),
            json!({"name": "C", "capacity": 10, "numbikesavailable": 3, "is_renting": "NON",
                   "is_returning": "NON", "coordonnees_geo": null}),
        ]);

        let output = CleaningPipeline::default().run(&batch);

        assert_eq!(output.report.raw_rows(), 3);
        assert_eq!(output.report.clean_rows(), 2);
        let names: Vec<_> = output.dataset.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec![Some("A"), Some("B")]);
        assert_eq!(output.dataset.records()[0].taux_dispo, 50.0);
        assert_eq!(output.dataset.records()[1].taux_dispo, 0.0);
        assert_eq!(output.report.rows_without_coordinates(), 1);
    }

    #[test]
    fn test_empty_batch_is_terminal() {
        let output = CleaningPipeline::default().run(&[]);
        assert!(output.dataset.is_empty());
        assert_eq!(output.report.raw_rows(), 0);
        assert!(matches!(output.report.status(), RunStatus::NoInput { .. }));
    }

    #[test]
    fn test_status_filter_runs_after_coordinates() {
        // Both non-operational and unplaceable: counted once, as a coordinate removal
        let batch = raw(vec![
            json!({"is_renting": "NON", "coordonnees_geo": null}),
            json!({"is_renting": "NON", "coordonnees_geo": {"lat": 48.8, "lon": 2.3}}),
        ]);

        let output = CleaningPipeline::default().run(&batch);

        assert_eq!(output.report.rows_without_coordinates(), 1);
        assert_eq!(output.report.rows_not_operational(), 1);
        assert_eq!(output.report.status(), &RunStatus::NoCleanRows);
    }

    #[test]
    fn test_dropped_column_absent_from_output() {
        let batch = raw(vec![
            json!({"name": "A", "nom_arrondissement_communes": "Paris",
                   "coordonnees_geo": {"lat": 48.8, "lon": 2.3}}),
            json!({"name": "B", "coordonnees_geo": {"lat": 48.8, "lon": 2.3}}),
            json!({"name": "C", "coordonnees_geo": {"lat": 48.8, "lon": 2.3}}),
        ]);

        let output = CleaningPipeline::default().run(&batch);

        assert!(!output.dataset.fields().contains(CanonicalField::Commune));
        assert!(output.dataset.iter().all(|r| r.commune().is_none()));
        assert_eq!(output.report.dropped_columns().len(), 1);
    }

    #[test]
    fn test_run_source_failure_is_not_an_error() {
        let output = CleaningPipeline::default().run_source(&InMemoryFeed::new(Vec::new()));
        assert!(output.dataset.is_empty());
        assert!(matches!(output.report.status(), RunStatus::NoInput { .. }));
    }
}

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use velib_processor::models::{CanonicalField, RawStationRecord};
use velib_processor::processors::RunStatus;
use velib_processor::readers::{FeedCache, JsonFeedReader};
use velib_processor::writers::{CsvWriter, ParquetWriter};
use velib_processor::{CleaningPipeline, PipelineConfig};
use validator::Validate;

fn raw(values: Vec<Value>) -> Vec<RawStationRecord> {
    values
        .into_iter()
        .filter_map(RawStationRecord::from_value)
        .collect()
}

fn station(name: &str, capacity: Value, bikes: Value, renting: &str) -> Value {
    json!({
        "name": name,
        "nom_arrondissement_communes": "Paris",
        "capacity": capacity,
        "numdocksavailable": 2,
        "numbikesavailable": bikes,
        "mechanical": 1,
        "ebike": 1,
        "is_renting": renting,
        "is_returning": "OUI",
        "coordonnees_geo": {"lat": 48.85, "lon": 2.35}
    })
}

fn write_feed(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).unwrap();
    file
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

    let ratios: Vec<(Option<&str>, f64)> = output
        .dataset
        .iter()
        .map(|r| (r.name(), r.taux_dispo))
        .collect();
    assert_eq!(ratios, vec![(Some("A"), 50.0), (Some("B"), 0.0)]);
}

#[test]
fn test_all_rows_without_coordinates() {
    let batch = raw(vec![
        json!({"name": "A", "capacity": 10, "numbikesavailable": 5}),
        json!({"name": "B", "capacity": 8, "numbikesavailable": 1}),
    ]);

    let output = CleaningPipeline::default().run(&batch);

    assert!(output.dataset.is_empty());
    assert_eq!(output.report.clean_rows(), 0);
    assert_eq!(output.report.raw_rows(), 2);
    assert_eq!(output.report.status(), &RunStatus::NoCleanRows);
    assert!(!output.is_usable());
}

#[test]
fn test_clean_rows_satisfy_value_constraints() {
    let batch = raw(vec![
        station("negative", json!(10), json!(-3), "OUI"),
        station("fraction", json!(7.9), json!(2.5), "OUI"),
        station("text", json!("12"), json!("n/a"), "OUI"),
        station("overfull", json!(4), json!(9), "OUI"),
        station("empty", json!(0), json!(0), "OUI"),
        station("null", Value::Null, Value::Null, "OUI"),
    ]);

    let output = CleaningPipeline::default().run(&batch);
    assert_eq!(output.dataset.len(), 6);

    for record in &output.dataset {
        assert!(record.lat.is_finite() && record.lon.is_finite());
        assert!((0.0..=100.0).contains(&record.taux_dispo));
        assert!(record.validate().is_ok());
        assert!(record.attributes.capacite_total.is_some());
        assert!(record.attributes.velos_dispo_total.is_some());

        if record.attributes.capacite_total == Some(0) {
            assert_eq!(record.taux_dispo, 0.0);
        }
    }

    let fraction = &output.dataset.records()[1];
    assert_eq!(fraction.attributes.capacite_total, Some(7));
    assert_eq!(fraction.attributes.velos_dispo_total, Some(2));

    let overfull = &output.dataset.records()[3];
    assert_eq!(overfull.taux_dispo, 100.0);
    assert_eq!(output.report.clamped_ratios(), 1);
}

#[test]
fn test_missing_ratio_boundary() {
    let located = |name: &str, commune: Option<&str>| {
        let mut value = json!({"name": name, "coordonnees_geo": {"lat": 48.8, "lon": 2.3}});
        if let Some(commune) = commune {
            value["nom_arrondissement_communes"] = json!(commune);
        }
        value
    };

    // Exactly half missing: kept and filled
    let half = raw(vec![
        located("A", Some("Paris")),
        located("B", None),
        located("C", Some("Montreuil")),
        located("D", None),
    ]);
    let output = CleaningPipeline::default().run(&half);
    assert!(output.dataset.fields().contains(CanonicalField::Commune));
    assert_eq!(output.dataset.records()[1].commune(), Some("Inconnue"));

    // Over half missing: absent everywhere
    let most = raw(vec![
        located("A", Some("Paris")),
        located("B", None),
        located("C", None),
    ]);
    let output = CleaningPipeline::default().run(&most);
    assert!(!output.dataset.fields().contains(CanonicalField::Commune));
    assert!(output.dataset.iter().all(|r| r.commune().is_none()));
    assert_eq!(output.report.dropped_columns()[0].field, CanonicalField::Commune);
}

#[test]
fn test_configured_threshold_and_geo_key() {
    let batch = raw(vec![
        json!({"name": "A", "nom_arrondissement_communes": "Paris",
               "position": {"lat": 48.8, "lon": 2.3}}),
        json!({"name": "B", "nom_arrondissement_communes": "Paris",
               "position": {"lat": 48.9, "lon": 2.4}}),
        json!({"name": "C", "position": {"lat": 48.7, "lon": 2.2}}),
    ]);
    let config = PipelineConfig::default()
        .with_missing_threshold(0.25)
        .with_geo_key("position");

    let output = CleaningPipeline::new(config).run(&batch);

    assert_eq!(output.dataset.len(), 3);
    assert!(!output.dataset.fields().contains(CanonicalField::Commune));
}

#[test]
fn test_malformed_fields_reported_as_warnings() {
    let batch = raw(vec![
        json!({"name": "A", "capacity": "beaucoup", "numbikesavailable": 3,
               "coordonnees_geo": {"lat": 48.8, "lon": 2.3}}),
        json!({"name": "B", "capacity": 10, "numbikesavailable": 4,
               "coordonnees_geo": "48.8,2.3"}),
    ]);

    let output = CleaningPipeline::default().run(&batch);

    assert_eq!(output.report.malformed_geo(), 1);
    assert_eq!(output.report.invalid_counts()[&CanonicalField::CapaciteTotal], 1);
    assert_eq!(output.report.rows_without_coordinates(), 1);
    assert_eq!(output.dataset.len(), 1);
    assert_eq!(output.dataset.records()[0].attributes.capacite_total, Some(0));

    let warnings: Vec<&str> = output
        .report
        .warnings()
        .map(|note| note.message.as_str())
        .collect();
    assert!(warnings.contains(&"1 malformed coordinate structures treated as absent"));
    assert!(warnings.contains(&"1 invalid values in 'CapaciteTotal' coerced to 0"));
}

#[test]
fn test_runs_are_idempotent() {
    let batch = raw(vec![
        station("A", json!(20), json!(5), "OUI"),
        station("B", json!(10), json!(10), "NON"),
        json!({"name": "C", "coordonnees_geo": "48.8,2.3"}),
    ]);
    let pipeline = CleaningPipeline::default();

    let first = pipeline.run(&batch);
    let second = pipeline.run(&batch);

    assert_eq!(first, second);
}

#[test]
fn test_custom_yes_token() {
    let batch = raw(vec![
        json!({"name": "A", "is_renting": "YES", "is_returning": "NO",
               "coordonnees_geo": {"lat": 48.8, "lon": 2.3}}),
        json!({"name": "B", "is_renting": "OUI", "is_returning": "OUI",
               "coordonnees_geo": {"lat": 48.8, "lon": 2.3}}),
    ]);
    let config = PipelineConfig::default().with_yes_token("YES");

    let output = CleaningPipeline::new(config).run(&batch);

    let names: Vec<_> = output.dataset.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec![Some("A")]);
    assert_eq!(output.dataset.records()[0].attributes.retour_possible, Some(false));
    assert_eq!(output.report.rows_not_operational(), 1);
}

#[test]
fn test_feed_file_to_parquet_and_csv() {
    let feed = json!({
        "results": [
            station("Bastille", json!(40), json!(10), "OUI"),
            station("Nation", json!(20), json!(0), "NON"),
            {"name": "Ghost", "capacity": 5}
        ]
    });
    let feed_file = write_feed(&feed.to_string());

    let mut cache = FeedCache::new(JsonFeedReader::new(feed_file.path()));
    let output = CleaningPipeline::default().run_cached(&mut cache);
    assert_eq!(output.report.status(), &RunStatus::Complete);
    assert_eq!(output.dataset.len(), 2);

    // A second run reuses the cached batch
    let again = CleaningPipeline::default().run_cached(&mut cache);
    assert_eq!(cache.fetches(), 1);
    assert_eq!(again.dataset, output.dataset);

    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let parquet_path = temp_dir.path().join("snapshot.parquet");
    let writer = ParquetWriter::new().with_row_group_size(1);
    writer.write_dataset(&output.dataset, &parquet_path).unwrap();
    let info = writer.get_file_info(&parquet_path).unwrap();
    assert_eq!(info.total_rows, 2);
    assert_eq!(info.row_groups, 2);
    assert_eq!(writer.read_dataset(&parquet_path, 0).unwrap(), output.dataset);

    let csv_path = temp_dir.path().join("snapshot.csv");
    CsvWriter::new()
        .write_dataset(&output.dataset, &csv_path)
        .unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.starts_with("NomStation,Commune,CapaciteTotal"));
}

#[test]
fn test_unreadable_feed_yields_no_input() {
    let feed_file = write_feed("{ not json");

    let output =
        CleaningPipeline::default().run_source(&JsonFeedReader::new(feed_file.path()));

    assert!(output.dataset.is_empty());
    assert!(matches!(output.report.status(), RunStatus::NoInput { .. }));
}

use crate::models::{CanonicalField, StationDataset};
use crate::processors::geo_extractor::GeoExtraction;
use crate::processors::metrics_calculator::{MetricsOutcome, RatioFidelity};
use crate::processors::missing_data::{ColumnDrop, MissingDataOutcome};
use crate::processors::type_coercer::CoercionOutcome;
use serde::Serialize;
use std::collections::BTreeMap;

/// Terminal state of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    /// The feed was absent, unreadable or empty
    NoInput { reason: String },
    /// Every station was removed during cleaning
    NoCleanRows,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityNote {
    pub level: NoteLevel,
    pub message: String,
}

impl QualityNote {
    fn info(message: String) -> Self {
        Self {
            level: NoteLevel::Info,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            level: NoteLevel::Warning,
            message,
        }
    }
}

/// Everything the stages observed during one run
#[derive(Debug, Clone, Default)]
pub struct RunObservations {
    pub raw_rows: usize,
    pub geo: GeoExtraction,
    pub missing: MissingDataOutcome,
    pub coercion: CoercionOutcome,
    pub rows_without_coordinates: usize,
    pub rows_not_operational: usize,
    pub metrics: MetricsOutcome,
}

/// Summary of what cleaning kept and removed. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityReport {
    status: RunStatus,
    raw_rows: usize,
    clean_rows: usize,
    dropped_columns: Vec<ColumnDrop>,
    filled_values: BTreeMap<CanonicalField, usize>,
    invalid_counts: BTreeMap<CanonicalField, usize>,
    malformed_geo: usize,
    invalid_coordinates: usize,
    rows_without_coordinates: usize,
    rows_not_operational: usize,
    fidelity: RatioFidelity,
    zero_capacity: usize,
    clamped_ratios: usize,
    notes: Vec<QualityNote>,
}

impl DataQualityReport {
    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn raw_rows(&self) -> usize {
        self.raw_rows
    }

    pub fn clean_rows(&self) -> usize {
        self.clean_rows
    }

    pub fn dropped_columns(&self) -> &[ColumnDrop] {
        &self.dropped_columns
    }

    pub fn filled_values(&self) -> &BTreeMap<CanonicalField, usize> {
        &self.filled_values
    }

    pub fn invalid_counts(&self) -> &BTreeMap<CanonicalField, usize> {
        &self.invalid_counts
    }

    pub fn malformed_geo(&self) -> usize {
        self.malformed_geo
    }

    pub fn invalid_coordinates(&self) -> usize {
        self.invalid_coordinates
    }

    pub fn rows_without_coordinates(&self) -> usize {
        self.rows_without_coordinates
    }

    pub fn rows_not_operational(&self) -> usize {
        self.rows_not_operational
    }

    pub fn fidelity(&self) -> &RatioFidelity {
        &self.fidelity
    }

    pub fn zero_capacity(&self) -> usize {
        self.zero_capacity
    }

    pub fn clamped_ratios(&self) -> usize {
        self.clamped_ratios
    }

    pub fn notes(&self) -> &[QualityNote] {
        &self.notes
    }

    pub fn warnings(&self) -> impl Iterator<Item = &QualityNote> {
        self.notes.iter().filter(|n| n.level == NoteLevel::Warning)
    }

    pub fn has_clean_rows(&self) -> bool {
        self.clean_rows > 0
    }

    pub fn retention_percentage(&self) -> f64 {
        if self.raw_rows == 0 {
            return 0.0;
        }
        100.0 * self.clean_rows as f64 / self.raw_rows as f64
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Data Quality Report ===\n");
        summary.push_str(&format!("Raw Stations: {}\n", self.raw_rows));
        summary.push_str(&format!(
            "Clean Stations: {} ({:.1}%)\n",
            self.clean_rows,
            self.retention_percentage()
        ));

        match &self.status {
            RunStatus::NoInput { reason } => {
                summary.push_str(&format!("\nNo usable input: {}\n", reason));
                return summary;
            }
            RunStatus::NoCleanRows => {
                summary.push_str("\nZero clean rows: every station was removed during cleaning\n");
            }
            RunStatus::Complete => {}
        }

        if self.dropped_columns.is_empty() {
            summary.push_str("Columns Dropped: none\n");
        } else {
            let dropped: Vec<String> = self
                .dropped_columns
                .iter()
                .map(|d| format!("{} ({:.1}% missing)", d.field, d.missing_ratio * 100.0))
                .collect();
            summary.push_str(&format!("Columns Dropped: {}\n", dropped.join(", ")));
        }
        summary.push_str(&format!(
            "Removed Without Coordinates: {}\n",
            self.rows_without_coordinates
        ));
        summary.push_str(&format!(
            "Removed As Non-Operational: {}\n",
            self.rows_not_operational
        ));
        match &self.fidelity {
            RatioFidelity::Full => summary.push_str("TauxDispo: computed\n"),
            RatioFidelity::Reduced { .. } => {
                summary.push_str("TauxDispo: reduced fidelity (all 0)\n")
            }
        }

        if !self.notes.is_empty() {
            summary.push_str("\nNotes:\n");
            for (i, note) in self.notes.iter().enumerate() {
                let tag = match note.level {
                    NoteLevel::Info => "info",
                    NoteLevel::Warning => "warn",
                };
                summary.push_str(&format!("  {}. [{}] {}\n", i + 1, tag, note.message));
            }
        }

        summary
    }
}

/// Builds the report after every other stage has finished
pub struct QualityReporter;

impl QualityReporter {
    pub fn new() -> Self {
        Self
    }

    /// Terminal report for a run that had nothing to clean
    pub fn no_input(&self, reason: &str) -> DataQualityReport {
        DataQualityReport {
            status: RunStatus::NoInput {
                reason: reason.to_string(),
            },
            raw_rows: 0,
            clean_rows: 0,
            dropped_columns: Vec::new(),
            filled_values: BTreeMap::new(),
            invalid_counts: BTreeMap::new(),
            malformed_geo: 0,
            invalid_coordinates: 0,
            rows_without_coordinates: 0,
            rows_not_operational: 0,
            fidelity: RatioFidelity::Full,
            zero_capacity: 0,
            clamped_ratios: 0,
            notes: vec![QualityNote::warning(format!("No usable input: {}", reason))],
        }
    }

    pub fn report(
        &self,
        observations: RunObservations,
        dataset: &StationDataset,
    ) -> DataQualityReport {
        let clean_rows = dataset.len();
        let notes = Self::notes(&observations, clean_rows);

        let status = if clean_rows == 0 {
            RunStatus::NoCleanRows
        } else {
            RunStatus::Complete
        };

        DataQualityReport {
            status,
            raw_rows: observations.raw_rows,
            clean_rows,
            dropped_columns: observations.missing.dropped,
            filled_values: observations.missing.filled,
            invalid_counts: observations.coercion.invalid_counts,
            malformed_geo: observations.geo.malformed,
            invalid_coordinates: observations.coercion.invalid_coordinates,
            rows_without_coordinates: observations.rows_without_coordinates,
            rows_not_operational: observations.rows_not_operational,
            fidelity: observations.metrics.fidelity,
            zero_capacity: observations.metrics.zero_capacity,
            clamped_ratios: observations.metrics.clamped,
            notes,
        }
    }

    fn notes(observations: &RunObservations, clean_rows: usize) -> Vec<QualityNote> {
        let mut notes = Vec::new();

        for drop in &observations.missing.dropped {
            notes.push(QualityNote::warning(format!(
                "Column '{}' dropped: {:.1}% of values missing",
                drop.field,
                drop.missing_ratio * 100.0
            )));
        }

        for (field, filled) in &observations.missing.filled {
            if *filled > 0 {
                notes.push(QualityNote::info(format!(
                    "{} absent values in '{}' replaced by the column default",
                    filled, field
                )));
            }
        }

        for (field, set) in &observations.missing.flags_set {
            if *set == 0 && observations.raw_rows > 0 {
                notes.push(QualityNote::warning(format!(
                    "No station reports '{}' as open; check the feed's status vocabulary",
                    field
                )));
            }
        }

        if observations.geo.malformed > 0 {
            notes.push(QualityNote::warning(format!(
                "{} malformed coordinate structures treated as absent",
                observations.geo.malformed
            )));
        }

        for (field, invalid) in &observations.coercion.invalid_counts {
            notes.push(QualityNote::warning(format!(
                "{} invalid values in '{}' coerced to 0",
                invalid, field
            )));
        }

        if observations.coercion.invalid_coordinates > 0 {
            notes.push(QualityNote::warning(format!(
                "{} non-numeric coordinate values discarded",
                observations.coercion.invalid_coordinates
            )));
        }

        if observations.rows_without_coordinates > 0 {
            notes.push(QualityNote::warning(format!(
                "{} stations removed for missing or invalid coordinates",
                observations.rows_without_coordinates
            )));
        }

        if observations.rows_not_operational > 0 {
            notes.push(QualityNote::info(format!(
                "{} stations removed as neither renting nor returning bikes",
                observations.rows_not_operational
            )));
        }

        if let RatioFidelity::Reduced { missing } = &observations.metrics.fidelity {
            let names: Vec<&str> = missing.iter().map(|f| f.name()).collect();
            notes.push(QualityNote::warning(format!(
                "TauxDispo set to 0 for all stations: missing {}",
                names.join(", ")
            )));
        }

        if observations.metrics.zero_capacity > 0 {
            notes.push(QualityNote::info(format!(
                "{} stations with zero capacity reported at 0% availability",
                observations.metrics.zero_capacity
            )));
        }

        if observations.metrics.clamped > 0 {
            notes.push(QualityNote::warning(format!(
                "{} stations report more bikes than capacity; TauxDispo capped at 100",
                observations.metrics.clamped
            )));
        }

        if clean_rows == 0 {
            notes.push(QualityNote::warning(
                "Zero clean rows: downstream processing should stop".to_string(),
            ));
        }

        notes
    }
}

impl Default for QualityReporter {
    fn default() -> Self {
        Self::new()
    }
}

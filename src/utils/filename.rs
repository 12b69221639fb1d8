use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default snapshot filename with format: velib-clean-{YYMMDD}.{extension}
pub fn generate_default_snapshot_filename(extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "velib-clean-{:02}{:02}{:02}.{}",
        year, month, day, extension
    );
    PathBuf::from("output").join(filename)
}

/// Path of the quality report written next to a snapshot file
pub fn report_path_for(snapshot: &std::path::Path) -> PathBuf {
    let stem = snapshot
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "velib-clean".to_string());
    snapshot.with_file_name(format!("{}-quality.json", stem))
}

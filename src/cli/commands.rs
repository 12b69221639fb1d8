use crate::analyzers::{AvailabilityAnalyzer, StationQuery};
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::error::{ProcessingError, Result};
use crate::processors::{CleaningPipeline, PipelineOutput};
use crate::readers::{FeedCache, JsonFeedReader};
use crate::settings::PipelineConfig;
use crate::utils::filename::{generate_default_snapshot_filename, report_path_for};
use crate::utils::progress::ProgressReporter;
use crate::writers::{write_geojson, write_json, CsvWriter, ParquetWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = PipelineConfig::load(cli.config.as_deref())?;
    // No spinner while debug logs go to stderr
    let silent = cli.verbose && cli.log_file.is_none();

    match cli.command {
        Commands::Process {
            input,
            output_file,
            format,
            compression,
            geojson,
            report_file,
        } => {
            println!("Cleaning station feed...");
            println!("Input file: {}", input.display());

            let output = clean_feed(input, config, silent).await?;
            println!("\n{}", output.report.summary());

            let output_file = output_file
                .unwrap_or_else(|| generate_default_snapshot_filename(format.extension()));
            create_parent_dir(&output_file)?;

            let report_file = report_file.unwrap_or_else(|| report_path_for(&output_file));
            create_parent_dir(&report_file)?;
            write_json(&output.report, &report_file)?;
            println!("Quality report written to {}", report_file.display());

            if !output.is_usable() {
                println!("No clean stations to write");
                return Ok(());
            }

            println!(
                "Writing {} stations to {}...",
                output.dataset.len(),
                output_file.display()
            );
            match format {
                OutputFormat::Parquet => {
                    let writer = ParquetWriter::new().with_compression(&compression)?;
                    writer.write_dataset(&output.dataset, &output_file)?;

                    let file_info = writer.get_file_info(&output_file)?;
                    println!("\n{}", file_info.summary());
                }
                OutputFormat::Csv => {
                    CsvWriter::new().write_dataset(&output.dataset, &output_file)?;
                }
            }

            if let Some(geojson) = geojson {
                create_parent_dir(&geojson)?;
                write_geojson(&output.dataset, &geojson)?;
                println!("GeoJSON written to {}", geojson.display());
            }

            println!("Processing complete!");
        }

        Commands::Validate { input } => {
            println!("Validating station feed...");
            println!("Input file: {}", input.display());

            let output = clean_feed(input, config, silent).await?;
            println!("\n{}", output.report.summary());

            let warnings: Vec<_> = output.report.warnings().collect();
            if warnings.is_empty() && output.report.has_clean_rows() {
                println!("✅ Feed cleaned without warnings");
            } else {
                println!("⚠️  Found {} quality warnings", warnings.len());
                for note in warnings {
                    println!("  - {}", note.message);
                }
            }
        }

        Commands::Summary {
            input,
            commune,
            min_bikes,
            bike_type,
            top,
        } => {
            let output = clean_feed(input, config, silent).await?;
            if !output.is_usable() {
                println!("{}", output.report.summary());
                return Ok(());
            }

            let min_bikes =
                min_bikes.unwrap_or_else(|| StationQuery::default_min_bikes(&output.dataset));
            let by_commune = commune.is_some();
            let selection = StationQuery::new()
                .with_commune(commune)
                .with_min_bikes(min_bikes)
                .with_bike_type(bike_type)
                .apply(&output.dataset);

            let analyzer = AvailabilityAnalyzer::new();
            println!("{}", analyzer.summarize(&selection).summary());

            if by_commune {
                println!("Stations by availability:");
                let stations = analyzer.station_ranking(&selection, top);
                for (i, record) in stations.iter().enumerate() {
                    println!(
                        "{:>3}. {} - {} bikes, {} free docks, {:.1}%",
                        i + 1,
                        record.name().unwrap_or("-"),
                        display_count(record.bikes_available()),
                        display_count(record.attributes.bornes_libres),
                        record.taux_dispo
                    );
                }
            }

            let ranking = analyzer.commune_ranking(&selection, top);
            if !ranking.is_empty() {
                println!("Communes by availability:");
                for (i, entry) in ranking.iter().enumerate() {
                    println!(
                        "{:>3}. {} - {:.1}% ({} stations)",
                        i + 1,
                        entry.commune,
                        entry.mean_availability,
                        entry.station_count
                    );
                }
            }
        }

        Commands::Info {
            file,
            sample,
            analysis_limit,
        } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;

            let dataset = writer.read_dataset(&file, analysis_limit)?;
            let summary = AvailabilityAnalyzer::new().summarize(&dataset);
            println!("\n{}", summary.summary());

            println!("File Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Stations (showing {} records):", sample);
                for (i, record) in dataset.iter().take(sample).enumerate() {
                    println!(
                        "{}. {} ({}) at ({:.5}, {:.5}): {:.1}% available",
                        i + 1,
                        record.name().unwrap_or("-"),
                        record.commune().unwrap_or("-"),
                        record.lat,
                        record.lon,
                        record.taux_dispo
                    );
                }
            }
        }
    }

    Ok(())
}

/// Read and clean a feed file off the async runtime
async fn clean_feed(
    input: PathBuf,
    config: PipelineConfig,
    silent: bool,
) -> Result<PipelineOutput> {
    let progress = ProgressReporter::new_spinner("Cleaning stations...", silent);

    let output = tokio::task::spawn_blocking(move || {
        let mut cache = FeedCache::new(JsonFeedReader::new(&input));
        CleaningPipeline::new(config).run_cached(&mut cache)
    })
    .await?;

    progress.finish_with_message(&format!(
        "Kept {} of {} stations",
        output.report.clean_rows(),
        output.report.raw_rows()
    ));
    info!("Run status: {:?}", output.report.status());

    Ok(output)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn display_count(count: Option<u32>) -> String {
    count.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

/// `RUST_LOG` when set, else `warn`; `--verbose` raises either to at least `debug`
fn log_filter(verbose: bool, env_directives: Option<&str>) -> EnvFilter {
    let default = if verbose { "debug" } else { "warn" };

    match env_directives {
        Some(directives) => {
            let filter =
                EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(default));
            if verbose {
                filter.add_directive(Level::DEBUG.into())
            } else {
                filter
            }
        }
        None => EnvFilter::new(default),
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(verbose, env_directives.as_deref());

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{Layer, Registry};

    fn max_level(filter: &EnvFilter) -> Option<LevelFilter> {
        Layer::<Registry>::max_level_hint(filter)
    }

    #[test]
    fn test_rust_log_is_not_lowered() {
        let filter = log_filter(false, Some("debug"));
        assert_eq!(max_level(&filter), Some(LevelFilter::DEBUG));

        let filter = log_filter(false, Some("trace"));
        assert_eq!(max_level(&filter), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_default_levels() {
        assert_eq!(max_level(&log_filter(false, None)), Some(LevelFilter::WARN));
        assert_eq!(max_level(&log_filter(true, None)), Some(LevelFilter::DEBUG));
        assert_eq!(max_level(&log_filter(true, Some("error"))), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_report_directory_is_created() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let report = temp_dir.path().join("reports").join("2024").join("run.json");

        create_parent_dir(&report).unwrap();
        write_json(&serde_json::json!({"clean_rows": 0}), &report).unwrap();

        assert!(report.exists());
    }
}

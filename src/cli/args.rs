use crate::analyzers::BikeType;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "velib-processor")]
#[command(about = "Cleans Vélib' station availability snapshots and reports on data quality")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Pipeline settings file (TOML)")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a raw feed file and write the snapshot
    Process {
        #[arg(short, long, help = "Raw feed file (JSON array or {\"results\": [...]})")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output snapshot path [default: output/velib-clean-{YYMMDD}.{format}]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "parquet")]
        format: OutputFormat,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, help = "Also write the stations as a GeoJSON FeatureCollection")]
        geojson: Option<PathBuf>,

        #[arg(
            long,
            help = "Quality report path [default: next to the snapshot, <stem>-quality.json]"
        )]
        report_file: Option<PathBuf>,
    },

    /// Clean a raw feed and print the quality report without writing anything
    Validate {
        #[arg(short, long, help = "Raw feed file")]
        input: PathBuf,
    },

    /// Availability overview of a cleaned feed, with optional station filters
    Summary {
        #[arg(short, long, help = "Raw feed file")]
        input: PathBuf,

        #[arg(long)]
        commune: Option<String>,

        #[arg(
            long,
            help = "Minimum available bikes [default: 1, or 0 when no station has bikes]"
        )]
        min_bikes: Option<u32>,

        #[arg(long, value_enum, default_value = "any")]
        bike_type: BikeType,

        #[arg(long, default_value = "20", help = "Entries to list in each ranking")]
        top: usize,
    },

    /// Display information about a Parquet snapshot
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(
            long,
            default_value = "0",
            help = "Maximum records to analyze (0 = all records)"
        )]
        analysis_limit: usize,
    },
}

pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{coordinate_from_value, is_placeable, parse_coordinate};
pub use filename::{generate_default_snapshot_filename, report_path_for};
pub use progress::ProgressReporter;

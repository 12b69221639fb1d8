/// Feed keys
pub const GEO_KEY: &str = "coordonnees_geo";
pub const GEO_LAT_KEY: &str = "lat";
pub const GEO_LON_KEY: &str = "lon";
pub const FEED_RESULTS_KEY: &str = "results";

/// Missing-data policy defaults
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.5;
pub const DEFAULT_FILL_TEXT: &str = "Inconnue";
pub const DEFAULT_YES_TOKEN: &str = "OUI";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "VELIB";

/// Derived column names
pub const LAT_COLUMN: &str = "lat";
pub const LON_COLUMN: &str = "lon";
pub const TAUX_DISPO_COLUMN: &str = "TauxDispo";

/// Availability ratio bounds (percent)
pub const MIN_AVAILABILITY: f64 = 0.0;
pub const MAX_AVAILABILITY: f64 = 100.0;

/// Availability bands used by map collaborators
pub const LOW_AVAILABILITY_BELOW: f64 = 10.0;
pub const MEDIUM_AVAILABILITY_BELOW: f64 = 30.0;
pub const COLOUR_LOW: &str = "#FF0000";
pub const COLOUR_MEDIUM: &str = "#FFA500";
pub const COLOUR_GOOD: &str = "#008000";

/// Dashboard defaults
pub const DEFAULT_COMMUNE_RANKING_SIZE: usize = 20;

/// Coordinate reference system of the feed
pub const WGS84_EPSG: u32 = 4326;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

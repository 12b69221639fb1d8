pub mod availability_analyzer;

pub use availability_analyzer::{
    AvailabilityAnalyzer, AvailabilitySummary, BikeType, CommuneAvailability, GeographicBounds,
    StationQuery,
};

use crate::error::{ProcessingError, Result};
use serde_json::Value;

/// Parse a decimal-degree coordinate from text
///
/// # Examples
/// ```
/// use velib_processor::utils::parse_coordinate;
///
/// let lat = parse_coordinate(" 48.8566 ").unwrap();
/// assert!((lat - 48.8566).abs() < 0.000001);
/// ```
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();

    trimmed.parse::<f64>().map_err(|_| {
        ProcessingError::InvalidCoordinate(format!("Invalid coordinate value: '{}'", coord_str))
    })
}

/// Read a coordinate out of a JSON value, accepting numbers and numeric text
pub fn coordinate_from_value(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            ProcessingError::InvalidCoordinate(format!("Unrepresentable coordinate: {}", n))
        }),
        Value::String(s) => parse_coordinate(s),
        other => Err(ProcessingError::InvalidCoordinate(format!(
            "Expected a number, got: {}",
            other
        ))),
    }
}

/// A coordinate pair can be placed on a map only if both members are finite
pub fn is_placeable(lat: Option<f64>, lon: Option<f64>) -> bool {
    matches!((lat, lon), (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite())
}

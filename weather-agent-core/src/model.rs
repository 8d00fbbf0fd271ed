use serde::{Deserialize, Serialize};

/// Description carried by a degraded record when the live lookup failed.
pub const UNAVAILABLE_DESCRIPTION: &str = "Information unavailable";

/// A point-in-time weather observation for a location.
///
/// Constructed once per query by the data source and immutable afterwards.
/// `location` and `description` are always populated, even for the degraded
/// case; `temperature_c` is 0 when `description` is the unavailable sentinel,
/// so a zero reading alone does not mean a real observation of 0 °C.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location: String,
    pub temperature_c: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed_kph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like_c: Option<f64>,
    /// Provider-supplied observation timestamp, kept opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<String>,
}

impl WeatherRecord {
    /// Record returned when the lookup failed: sentinel description,
    /// temperature 0, no optional fields.
    pub fn unavailable(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            temperature_c: 0.0,
            description: UNAVAILABLE_DESCRIPTION.to_string(),
            humidity_pct: None,
            wind_speed_kph: None,
            feels_like_c: None,
            observed_at: None,
        }
    }

    /// Serialized form handed to the response generator. Key order follows
    /// the struct declaration, so it is stable across runs.
    pub fn prompt_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Normalized current-conditions reading, metric units.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub conditions: String,
    pub icon: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    /// Server-side timestamp taken when the snapshot was normalized.
    pub timestamp: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// "City,CC" composite label used for history records and lookups.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{},{}", self.city, self.country)
    }
}

/// One sampled future time-point from the 3-hour forecast series.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastEntry {
    pub date: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub icon: String,
    pub conditions: String,
}

/// Current conditions plus the sampled 5-day outlook for one location.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub current: WeatherSnapshot,
    pub forecast: Vec<ForecastEntry>,
}

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::WeatherConfig;
use crate::models::weather::{ForecastEntry, WeatherReport, WeatherSnapshot};

/// Every 8th entry of the 3-hour series is one sample per 24 hours.
const FORECAST_SAMPLE_STEP: usize = 8;
const FORECAST_DAYS: usize = 5;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Failure reported inside the provider's JSON payload.
    #[error("{0}")]
    Provider(String),

    /// Network or protocol failure before a usable payload arrived.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Payload arrived but did not match the expected shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

// ============================================================================
// Provider payload types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    name: String,
    sys: SysSection,
    main: MainSection,
    weather: Vec<ConditionSection>,
    wind: WindSection,
}

#[derive(Debug, Deserialize)]
struct SysSection {
    country: String,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionSection {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WindSection {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt_txt: String,
    main: ForecastMain,
    weather: Vec<ConditionSection>,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp_max: f64,
    temp_min: f64,
}

// ============================================================================
// Client
// ============================================================================

/// OpenWeatherMap client. Holds the API key for its whole lifetime; the key
/// is injected at construction, never read from the environment per call.
#[derive(Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.request_timeout_seconds.into(),
            ))
            .user_agent("Skycast/1.0")
            .build()?;

        Ok(Self::with_shared_client(http, config))
    }

    #[must_use]
    pub fn with_shared_client(http: Client, config: &WeatherConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Current conditions for a free-text location ("City" or "City,CC").
    pub async fn current(&self, location: &str) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!(
            "{}/weather?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(location),
            self.api_key
        );

        let payload = self.get_json(&url).await?;
        parse_current(&payload)
    }

    /// 5-day outlook sampled from the provider's 3-hour forecast series.
    /// A payload without a series yields an empty outlook.
    pub async fn forecast(&self, location: &str) -> Result<Vec<ForecastEntry>, WeatherError> {
        let url = format!(
            "{}/forecast?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(location),
            self.api_key
        );

        let payload = self.get_json(&url).await?;
        parse_forecast(&payload)
    }

    /// Resolve coordinates to a "City,CC" label via the current-conditions
    /// endpoint.
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<String, WeatherError> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, lat, lon, self.api_key
        );

        let payload = self.get_json(&url).await?;
        let snapshot = parse_current(&payload)?;
        Ok(snapshot.label())
    }

    /// Current conditions plus the sampled outlook, in that order.
    pub async fn fetch(&self, location: &str) -> Result<WeatherReport, WeatherError> {
        let current = self.current(location).await?;
        let forecast = self.forecast(location).await?;

        Ok(WeatherReport { current, forecast })
    }

    async fn get_json(&self, url: &str) -> Result<Value, WeatherError> {
        let response = self.http.get(url).send().await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| WeatherError::Malformed(e.to_string()))
    }
}

// ============================================================================
// Payload normalization
// ============================================================================

/// The provider embeds its own status in the payload: a number on /weather,
/// a string on /forecast.
fn embedded_status(payload: &Value) -> Option<i64> {
    match payload.get("cod") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// Reject payloads whose embedded status is anything but 200, carrying the
/// provider's own message text.
fn check_status(payload: &Value) -> Result<(), WeatherError> {
    if embedded_status(payload) == Some(200) {
        return Ok(());
    }

    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string();

    Err(WeatherError::Provider(message))
}

fn parse_current(payload: &Value) -> Result<WeatherSnapshot, WeatherError> {
    check_status(payload)?;

    let current: CurrentPayload = serde_json::from_value(payload.clone())
        .map_err(|e| WeatherError::Malformed(e.to_string()))?;

    let condition = current
        .weather
        .first()
        .ok_or_else(|| WeatherError::Malformed("missing weather conditions".to_string()))?;

    Ok(WeatherSnapshot {
        city: current.name,
        country: current.sys.country,
        temperature: current.main.temp,
        conditions: condition.description.clone(),
        icon: condition.icon.clone(),
        humidity: current.main.humidity,
        wind_speed: current.wind.speed,
        pressure: current.main.pressure,
        timestamp: Utc::now(),
    })
}

fn parse_forecast(payload: &Value) -> Result<Vec<ForecastEntry>, WeatherError> {
    let forecast: ForecastPayload = serde_json::from_value(payload.clone())
        .map_err(|e| WeatherError::Malformed(e.to_string()))?;

    Ok(sample_outlook(&forecast.list))
}

/// Sample one entry per day out of the 3-hour series: indices 0, 8, 16, ...
/// capped at five days. Entries without a conditions element are skipped.
fn sample_outlook(series: &[ForecastItem]) -> Vec<ForecastEntry> {
    series
        .iter()
        .step_by(FORECAST_SAMPLE_STEP)
        .take(FORECAST_DAYS)
        .filter_map(|item| {
            let condition = item.weather.first()?;
            Some(ForecastEntry {
                date: item.dt_txt.clone(),
                temp_max: item.main.temp_max,
                temp_min: item.main.temp_min,
                icon: condition.icon.clone(),
                conditions: condition.description.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn forecast_series(n: usize) -> Vec<ForecastItem> {
        (0..n)
            .map(|i| ForecastItem {
                dt_txt: format!("2026-08-{:02} 12:00:00", i / 8 + 1),
                main: ForecastMain {
                    temp_max: 20.0 + i as f64,
                    temp_min: 10.0 + i as f64,
                },
                weather: vec![ConditionSection {
                    description: "few clouds".to_string(),
                    icon: "02d".to_string(),
                }],
            })
            .collect()
    }

    #[test]
    fn outlook_samples_every_eighth_entry() {
        let series = forecast_series(40);
        let outlook = sample_outlook(&series);

        assert_eq!(outlook.len(), 5);
        for (day, entry) in outlook.iter().enumerate() {
            assert_eq!(entry.temp_max, 20.0 + (day * 8) as f64);
        }
    }

    #[test]
    fn outlook_length_tracks_series_length() {
        for (n, expected) in [(0, 0), (1, 1), (8, 1), (9, 2), (17, 3), (32, 4), (33, 5), (64, 5)] {
            let series = forecast_series(n);
            assert_eq!(sample_outlook(&series).len(), expected, "series len {n}");
        }
    }

    #[test]
    fn embedded_status_accepts_number_and_string() {
        assert_eq!(embedded_status(&json!({"cod": 200})), Some(200));
        assert_eq!(embedded_status(&json!({"cod": "404"})), Some(404));
        assert_eq!(embedded_status(&json!({})), None);
    }

    #[test]
    fn provider_error_carries_message() {
        let payload = json!({"cod": "404", "message": "city not found"});
        let err = parse_current(&payload).unwrap_err();
        assert!(matches!(err, WeatherError::Provider(ref m) if m == "city not found"));
    }

    #[test]
    fn parse_current_normalizes_payload() {
        let payload = json!({
            "cod": 200,
            "name": "Paris",
            "sys": {"country": "FR"},
            "main": {"temp": 18.5, "humidity": 60.0, "pressure": 1013.0},
            "weather": [{"description": "clear sky", "icon": "01d"}],
            "wind": {"speed": 3.2}
        });

        let snapshot = parse_current(&payload).unwrap();
        assert_eq!(snapshot.city, "Paris");
        assert_eq!(snapshot.country, "FR");
        assert_eq!(snapshot.temperature, 18.5);
        assert_eq!(snapshot.conditions, "clear sky");
        assert_eq!(snapshot.label(), "Paris,FR");
    }

    #[test]
    fn forecast_without_series_is_empty() {
        let outlook = parse_forecast(&json!({"cod": "200"})).unwrap();
        assert!(outlook.is_empty());
    }
}

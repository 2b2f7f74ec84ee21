use std::sync::Arc;

use crate::clients::OpenWeatherClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::WeatherService;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Skycast/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub weather: Arc<OpenWeatherClient>,

    pub weather_service: Arc<WeatherService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client =
            build_shared_http_client(config.weather.request_timeout_seconds.into())?;

        let weather = Arc::new(OpenWeatherClient::with_shared_client(
            http_client,
            &config.weather,
        ));

        let weather_service = Arc::new(WeatherService::new(
            weather.clone(),
            store.clone(),
            config.weather.default_location.clone(),
        ));

        Ok(Self {
            config,
            store,
            weather,
            weather_service,
        })
    }
}

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use crate::clients::OpenWeatherClient;
use crate::db::{FavoriteCity, Store, User};
use crate::models::weather::{ForecastEntry, WeatherSnapshot};

/// How many distinct recent search labels the view carries.
const RECENT_SEARCH_LIMIT: u64 = 5;

/// Everything one page render needs. Lookup failures degrade to an empty
/// view carrying warning messages rather than an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeatherView {
    pub current: Option<WeatherSnapshot>,
    pub forecast: Vec<ForecastEntry>,
    pub favorites: Vec<FavoriteCity>,
    pub is_favorite: bool,
    pub recent_searches: Vec<String>,
    pub warnings: Vec<String>,
}

/// Turns one incoming view request into a fully populated view model:
/// resolves the target location, calls the provider, and (for
/// authenticated users) records history and favorite status.
pub struct WeatherService {
    client: Arc<OpenWeatherClient>,
    store: Store,
    default_location: String,
}

impl WeatherService {
    #[must_use]
    pub fn new(client: Arc<OpenWeatherClient>, store: Store, default_location: String) -> Self {
        Self {
            client,
            store,
            default_location,
        }
    }

    /// One stateless pass per request. `user` is the explicit current-user
    /// value; `None` renders an anonymous view and writes nothing.
    ///
    /// Errors surface only for store failures; provider and geocoding
    /// failures degrade into view warnings.
    pub async fn lookup(
        &self,
        city: Option<&str>,
        coords: Option<(f64, f64)>,
        user: Option<&User>,
    ) -> Result<WeatherView> {
        let mut view = WeatherView::default();

        let mut location = city
            .map(str::to_string)
            .unwrap_or_else(|| self.default_location.clone());

        // Explicit coordinates win, but a failed reverse lookup only warns
        // and keeps the prior location.
        if let Some((lat, lon)) = coords {
            match self.client.reverse_geocode(lat, lon).await {
                Ok(label) => location = label,
                Err(e) => {
                    warn!("Reverse geocoding ({lat}, {lon}) failed: {e}");
                    view.warnings.push(format!("Geolocation failed: {e}"));
                }
            }
        }

        let report = match self.client.fetch(&location).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Weather lookup for '{location}' failed: {e}");
                view.warnings.push(format!("Weather data unavailable: {e}"));
                return Ok(view);
            }
        };

        if let Some(user) = user {
            view.is_favorite = self
                .store
                .is_favorite(user.id, &report.current.city, &report.current.country)
                .await?;

            self.store.record_search(user.id, &report.current).await?;

            view.favorites = self.store.list_favorites(user.id).await?;
            view.recent_searches = self
                .store
                .recent_search_labels(user.id, RECENT_SEARCH_LIMIT)
                .await?;
        }

        view.current = Some(report.current);
        view.forecast = report.forecast;

        Ok(view)
    }
}

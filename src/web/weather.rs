use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{AppState, WebError, auth, templates};

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// GET /
/// Main weather view: explicit coordinates win over the `city` parameter,
/// which wins over the configured default location. Anonymous visitors get
/// current conditions and the outlook only.
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<WeatherQuery>,
) -> Result<Html<String>, WebError> {
    let user = auth::current_user(&session, &state).await?;

    let coords = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => None,
    };

    let view = state
        .weather_service()
        .lookup(query.city.as_deref(), coords, user.as_ref())
        .await
        .map_err(|e| WebError::internal(format!("Failed to build weather view: {e}")))?;

    Ok(Html(templates::weather_page(&view, user.as_ref())))
}

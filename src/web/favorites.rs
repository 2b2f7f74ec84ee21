use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{AppState, WebError, auth, templates};
use crate::services::location::{normalize_city, normalize_country};

#[derive(Debug, Deserialize)]
pub struct FavoriteForm {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// POST /save-favorite/
/// Idempotently saves the normalized (city, country) pair and returns the
/// "saved" toggle fragment. Empty values after normalization skip the
/// store call silently.
pub async fn save_favorite(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<FavoriteForm>,
) -> Result<Response, WebError> {
    let user = auth::current_user(&session, &state)
        .await?
        .ok_or(WebError::Unauthorized)?;

    let city = normalize_city(&form.city);
    let country = normalize_country(&form.country);

    if !city.is_empty() && !country.is_empty() {
        state
            .store()
            .add_favorite(user.id, &city, &country)
            .await
            .map_err(|e| WebError::database(e.to_string()))?;
    }

    Ok(Html(templates::saved_toggle(&city, &country)).into_response())
}

/// POST /remove-favorite/
/// Deletes the matching favorite (deleting a non-existent one is fine),
/// then picks the fragment by where the request came from: the favorites
/// list (`HX-Target: fav-*`) gets an empty body so the element disappears,
/// the main card gets the "save" toggle back.
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<FavoriteForm>,
) -> Result<Response, WebError> {
    let user = auth::current_user(&session, &state)
        .await?
        .ok_or(WebError::Unauthorized)?;

    let city = normalize_city(&form.city);
    let country = normalize_country(&form.country);

    if !city.is_empty() && !country.is_empty() {
        state
            .store()
            .remove_favorite(user.id, &city, &country)
            .await
            .map_err(|e| WebError::database(e.to_string()))?;
    }

    let target = headers
        .get("HX-Target")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if target.starts_with("fav-") {
        return Ok(String::new().into_response());
    }

    Ok(Html(templates::save_toggle(&city, &country)).into_response())
}

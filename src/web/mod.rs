use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::config::Config;
use crate::services::WeatherService;
use crate::state::SharedState;

pub mod auth;
mod error;
pub mod favorites;
pub mod templates;
pub mod weather;

pub use error::WebError;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn weather_service(&self) -> &Arc<WeatherService> {
        &self.shared.weather_service
    }
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(Arc::new(AppState { shared }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let (secure_cookies, session_minutes) = {
        let config = state.config();
        (config.server.secure_cookies, config.server.session_minutes)
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let protected_routes = Router::new()
        .route("/save-favorite/", post(favorites::save_favorite))
        .route("/remove-favorite/", post(favorites::remove_favorite))
        .route_layer(middleware::from_fn(auth::require_login));

    Router::new()
        .route("/", get(weather::index))
        .route("/signup/", get(auth::signup_form).post(auth::signup))
        .route("/login/", get(auth::login_form).post(auth::login))
        .route("/logout/", post(auth::logout))
        .merge(protected_routes)
        .layer(session_layer)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

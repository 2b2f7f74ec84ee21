//! End-to-end tests for the web flows: the router runs against a local
//! mock weather provider and a temp-file SQLite database.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::Query,
    http::{Request, StatusCode, header},
    routing::get,
};
use http_body_util::BodyExt;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use tower::ServiceExt;

use skycast::config::Config;
use skycast::web::AppState;

// ============================================================================
// Mock weather provider
// ============================================================================

async fn mock_weather(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.contains_key("lat") {
        return Json(json!({"cod": 400, "message": "bad coordinates"}));
    }

    let q = params.get("q").cloned().unwrap_or_default();
    let (city, country) = q
        .split_once(',')
        .map_or((q.clone(), "XX".to_string()), |(c, cc)| {
            (c.to_string(), cc.to_string())
        });

    if city == "Nowhere" {
        return Json(json!({"cod": "404", "message": "city not found"}));
    }

    let temp = if city == "Paris" { 18.5 } else { 12.0 };

    Json(json!({
        "cod": 200,
        "name": city,
        "sys": {"country": country},
        "main": {"temp": temp, "humidity": 60.0, "pressure": 1013.0},
        "weather": [{"description": "clear sky", "icon": "01d"}],
        "wind": {"speed": 3.2},
    }))
}

async fn mock_forecast(Query(_params): Query<HashMap<String, String>>) -> Json<Value> {
    let list: Vec<Value> = (0..16)
        .map(|i| {
            json!({
                "dt_txt": format!("2026-08-{:02} 12:00:00", 8 + i / 8),
                "main": {"temp_max": 20.0 + f64::from(i), "temp_min": 10.0},
                "weather": [{"description": "few clouds", "icon": "02d"}],
            })
        })
        .collect();

    Json(json!({"cod": "200", "list": list}))
}

/// Bind the mock provider on an ephemeral port and return its base URL.
async fn spawn_provider() -> String {
    let app = Router::new()
        .route("/weather", get(mock_weather))
        .route("/forecast", get(mock_forecast));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock provider");
    let addr = listener.local_addr().expect("missing local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}")
}

// ============================================================================
// App harness
// ============================================================================

async fn spawn_app() -> (Arc<AppState>, Router) {
    let db_path = std::env::temp_dir().join(format!("skycast-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.weather.base_url = spawn_provider().await;
    config.weather.api_key = "test-key".to_string();
    config.server.secure_cookies = false;

    let state = skycast::web::create_app_state_from_config(config)
        .await
        .expect("failed to create app state");
    let router = skycast::web::router(state.clone());

    (state, router)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref());

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// Register and log in one user, returning the session cookie.
async fn login(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(form_request(
            "/signup/",
            &format!("username={username}&password=password123&password_confirm=password123"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(form_request(
            "/login/",
            &format!("username={username}&password=password123"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login did not set a session cookie")
        .to_str()
        .unwrap();

    cookie.split(';').next().unwrap().to_string()
}

async fn total_history_rows(state: &AppState) -> u64 {
    skycast::entities::search_history::Entity::find()
        .count(&state.store().conn)
        .await
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn anonymous_lookup_renders_weather_without_history() {
    let (state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/?city=Lisbon,PT")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("Lisbon"));
    assert!(body.contains("5-day outlook"));
    assert!(!body.contains("Favorite cities"));
    assert!(!body.contains("Recent searches"));

    assert_eq!(total_history_rows(&state).await, 0);
}

#[tokio::test]
async fn provider_error_renders_warning_with_message() {
    let (state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/?city=Nowhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("Weather data unavailable"));
    assert!(body.contains("city not found"));
    assert!(body.contains("No weather data to show"));
    assert!(!body.contains("5-day outlook"));

    assert_eq!(total_history_rows(&state).await, 0);
}

#[tokio::test]
async fn failed_geocoding_falls_back_to_default_location() {
    let (_state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/?lat=51.5&lon=-0.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("Geolocation failed"));
    // Weather still renders, for the configured default location.
    assert!(body.contains("London"));
}

#[tokio::test]
async fn favorite_endpoints_require_login() {
    let (_state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(form_request("/save-favorite/", "city=Paris&country=FR", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login/"
    );
}

#[tokio::test]
async fn authenticated_lookup_records_history() {
    let (state, app) = spawn_app().await;
    let cookie = login(&app, "ada").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/?city=Paris,FR")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("Paris"));
    assert!(body.contains("18.5"));
    // Not a favorite yet, so the card offers saving.
    assert!(body.contains("Save Location"));

    let user = state
        .store()
        .get_user_by_username("ada")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(state.store().search_count(user.id).await.unwrap(), 1);

    let labels = state.store().recent_search_labels(user.id, 5).await.unwrap();
    assert_eq!(labels, vec!["Paris,FR"]);
}

#[tokio::test]
async fn favorite_roundtrip_with_fragments() {
    let (state, app) = spawn_app().await;
    let cookie = login(&app, "ada").await;

    // Messy input normalizes to (Paris, FR); saving twice stays one row.
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(form_request(
                "/save-favorite/",
                "city=%20%20paris%20&country=fr",
                Some(&cookie),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let fragment = body_string(response).await;
        assert!(fragment.contains("Saved"));
        assert!(fragment.contains(r#"hx-post="/remove-favorite/""#));
    }

    let user = state
        .store()
        .get_user_by_username("ada")
        .await
        .unwrap()
        .unwrap();

    let favorites = state.store().list_favorites(user.id).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].city, "Paris");
    assert_eq!(favorites[0].country_code.as_deref(), Some("FR"));

    // The main view now shows the saved state for that city.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/?city=Paris,FR")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(body.contains("Saved"));
    assert!(body.contains("Favorite cities"));

    // Removal from the favorites sidebar returns an empty fragment.
    let mut request = form_request(
        "/remove-favorite/",
        "city=Paris&country=FR",
        Some(&cookie),
    );
    request
        .headers_mut()
        .insert("HX-Target", format!("fav-{}", favorites[0].id).parse().unwrap());

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.is_empty());

    assert!(state
        .store()
        .list_favorites(user.id)
        .await
        .unwrap()
        .is_empty());

    // Removing again (now non-existent) from the main card returns the
    // save toggle and stays a 200.
    let response = app
        .clone()
        .oneshot(form_request(
            "/remove-favorite/",
            "city=Paris&country=FR",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fragment = body_string(response).await;
    assert!(fragment.contains("Save Location"));
    assert!(fragment.contains(r#"hx-post="/save-favorite/""#));
}

#[tokio::test]
async fn empty_fields_skip_the_store() {
    let (state, app) = spawn_app().await;
    let cookie = login(&app, "ada").await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/save-favorite/",
            "city=%20%20&country=",
            Some(&cookie),
        ))
        .await
        .unwrap();

    // Silently skipped: still a fragment, nothing persisted.
    assert_eq!(response.status(), StatusCode::OK);

    let user = state
        .store()
        .get_user_by_username("ada")
        .await
        .unwrap()
        .unwrap();
    assert!(state
        .store()
        .list_favorites(user.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn signup_rejects_mismatched_passwords() {
    let (_state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/signup/",
            "username=ada&password=password123&password_confirm=different123",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Passwords do not match"));
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let (_state, app) = spawn_app().await;
    login(&app, "ada").await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/login/",
            "username=ada&password=wrong-password",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Invalid credentials"));
}

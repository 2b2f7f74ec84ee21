//! Server-side HTML rendering: one full page plus the HTMX fragments the
//! favorite-toggle endpoints return for partial updates.

use html_escape::{encode_single_quoted_attribute, encode_text};

use crate::db::User;
use crate::services::WeatherView;

/// `hx-vals` payload for the toggle buttons, safe inside a single-quoted
/// attribute.
fn toggle_vals(city: &str, country: &str) -> String {
    let vals = serde_json::json!({ "city": city, "country": country }).to_string();
    encode_single_quoted_attribute(&vals).into_owned()
}

/// "♥ Save Location" button shown when the current city is not a favorite.
#[must_use]
pub fn save_toggle(city: &str, country: &str) -> String {
    format!(
        r#"<button hx-post="/save-favorite/"
        hx-vals='{vals}'
        hx-target="this"
        hx-swap="outerHTML"
        class="text-white hover:text-yellow-300 flex items-center">
    &hearts; Save Location
</button>"#,
        vals = toggle_vals(city, country)
    )
}

/// "★ Saved" button shown once the current city is a favorite.
#[must_use]
pub fn saved_toggle(city: &str, country: &str) -> String {
    format!(
        r#"<button hx-post="/remove-favorite/"
        hx-vals='{vals}'
        hx-target="this"
        hx-swap="outerHTML"
        class="text-yellow-400 hover:text-yellow-300 flex items-center">
    &starf; Saved
</button>"#,
        vals = toggle_vals(city, country)
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} - Skycast</title>
    <script src="https://unpkg.com/htmx.org@2.0.4"></script>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-slate-900 text-slate-100 min-h-screen">
<div class="max-w-4xl mx-auto p-6">
{body}
</div>
</body>
</html>"#,
        title = encode_text(title),
    )
}

fn nav(user: Option<&User>) -> String {
    match user {
        Some(user) => format!(
            r#"<nav class="flex justify-between items-center mb-6">
    <a href="/" class="text-2xl font-bold">Skycast</a>
    <div class="flex items-center gap-4">
        <span class="text-slate-400">{username}</span>
        <form method="post" action="/logout/">
            <button type="submit" class="text-slate-300 hover:text-white">Log out</button>
        </form>
    </div>
</nav>"#,
            username = encode_text(&user.username),
        ),
        None => r#"<nav class="flex justify-between items-center mb-6">
    <a href="/" class="text-2xl font-bold">Skycast</a>
    <div class="flex items-center gap-4">
        <a href="/login/" class="text-slate-300 hover:text-white">Log in</a>
        <a href="/signup/" class="text-slate-300 hover:text-white">Sign up</a>
    </div>
</nav>"#
            .to_string(),
    }
}

fn warning_banners(warnings: &[String]) -> String {
    warnings
        .iter()
        .map(|message| {
            format!(
                r#"<div class="bg-red-900/60 border border-red-700 rounded p-3 mb-4">{}</div>"#,
                encode_text(message)
            )
        })
        .collect()
}

fn current_card(view: &WeatherView, authenticated: bool) -> String {
    let Some(current) = &view.current else {
        return r#"<div class="bg-slate-800 rounded-lg p-6 mb-6 text-slate-400">No weather data to show.</div>"#
            .to_string();
    };

    let toggle = if authenticated {
        if view.is_favorite {
            saved_toggle(&current.city, &current.country)
        } else {
            save_toggle(&current.city, &current.country)
        }
    } else {
        String::new()
    };

    format!(
        r#"<div class="bg-slate-800 rounded-lg p-6 mb-6">
    <div class="flex justify-between items-start">
        <div>
            <h2 class="text-3xl font-bold">{city}, {country}</h2>
            <p class="text-slate-400 capitalize">{conditions}</p>
        </div>
        {toggle}
    </div>
    <div class="flex items-center gap-6 mt-4">
        <img src="https://openweathermap.org/img/wn/{icon}@2x.png" alt="{conditions}">
        <span class="text-5xl font-bold">{temperature:.1}&deg;C</span>
    </div>
    <div class="grid grid-cols-3 gap-4 mt-4 text-sm text-slate-300">
        <div>Humidity: {humidity:.0}%</div>
        <div>Wind: {wind_speed:.1} m/s</div>
        <div>Pressure: {pressure:.0} hPa</div>
    </div>
</div>"#,
        city = encode_text(&current.city),
        country = encode_text(&current.country),
        conditions = encode_text(&current.conditions),
        icon = encode_text(&current.icon),
        temperature = current.temperature,
        humidity = current.humidity,
        wind_speed = current.wind_speed,
        pressure = current.pressure,
    )
}

fn forecast_strip(view: &WeatherView) -> String {
    if view.forecast.is_empty() {
        return String::new();
    }

    let entries: String = view
        .forecast
        .iter()
        .map(|entry| {
            format!(
                r#"<div class="bg-slate-800 rounded-lg p-4 text-center">
    <p class="text-sm text-slate-400">{date}</p>
    <img class="mx-auto" src="https://openweathermap.org/img/wn/{icon}.png" alt="{conditions}">
    <p class="text-sm capitalize">{conditions}</p>
    <p class="mt-1">{max:.0}&deg; / {min:.0}&deg;</p>
</div>"#,
                date = encode_text(&entry.date),
                icon = encode_text(&entry.icon),
                conditions = encode_text(&entry.conditions),
                max = entry.temp_max,
                min = entry.temp_min,
            )
        })
        .collect();

    format!(
        r#"<h3 class="text-xl font-semibold mb-3">5-day outlook</h3>
<div class="grid grid-cols-5 gap-3 mb-6">{entries}</div>"#
    )
}

fn favorites_section(view: &WeatherView) -> String {
    if view.favorites.is_empty() {
        return String::new();
    }

    let items: String = view
        .favorites
        .iter()
        .map(|favorite| {
            let country = favorite.country_code.as_deref().unwrap_or("");
            format!(
                r##"<li id="fav-{id}" class="flex justify-between items-center py-1">
    <a href="/?city={query}" class="hover:text-yellow-300">{city}, {country}</a>
    <button hx-post="/remove-favorite/"
            hx-vals='{vals}'
            hx-target="#fav-{id}"
            hx-swap="outerHTML"
            class="text-slate-500 hover:text-red-400">&times;</button>
</li>"##,
                id = favorite.id,
                query = urlencoding::encode(&format!("{},{}", favorite.city, country)),
                city = encode_text(&favorite.city),
                country = encode_text(country),
                vals = toggle_vals(&favorite.city, country),
            )
        })
        .collect();

    format!(
        r#"<div class="bg-slate-800 rounded-lg p-4 mb-6">
    <h3 class="text-lg font-semibold mb-2">Favorite cities</h3>
    <ul>{items}</ul>
</div>"#
    )
}

fn recent_searches_section(view: &WeatherView) -> String {
    if view.recent_searches.is_empty() {
        return String::new();
    }

    let items: String = view
        .recent_searches
        .iter()
        .map(|label| {
            format!(
                r#"<li><a href="/?city={query}" class="hover:text-yellow-300">{label}</a></li>"#,
                query = urlencoding::encode(label),
                label = encode_text(label),
            )
        })
        .collect();

    format!(
        r#"<div class="bg-slate-800 rounded-lg p-4 mb-6">
    <h3 class="text-lg font-semibold mb-2">Recent searches</h3>
    <ul class="space-y-1">{items}</ul>
</div>"#
    )
}

/// The main weather view: search form, warnings, current-conditions card,
/// outlook, favorites, recent searches.
#[must_use]
pub fn weather_page(view: &WeatherView, user: Option<&User>) -> String {
    let body = format!(
        r#"{nav}
<form method="get" action="/" class="flex gap-2 mb-6">
    <input type="text" name="city" placeholder="City,CountryCode"
           class="flex-1 rounded bg-slate-800 border border-slate-700 px-3 py-2">
    <button type="submit" class="bg-sky-600 hover:bg-sky-500 rounded px-4 py-2">Search</button>
</form>
{warnings}
{current}
{forecast}
{favorites}
{recent}"#,
        nav = nav(user),
        warnings = warning_banners(&view.warnings),
        current = current_card(view, user.is_some()),
        forecast = forecast_strip(view),
        favorites = favorites_section(view),
        recent = recent_searches_section(view),
    );

    layout("Weather", &body)
}

fn auth_form(title: &str, action: &str, fields: &str, footer: &str, error: Option<&str>) -> String {
    let banner = error.map_or_else(String::new, |message| {
        format!(
            r#"<div class="bg-red-900/60 border border-red-700 rounded p-3 mb-4">{}</div>"#,
            encode_text(message)
        )
    });

    let body = format!(
        r#"<div class="max-w-sm mx-auto mt-16 bg-slate-800 rounded-lg p-6">
    <h1 class="text-2xl font-bold mb-4">{title}</h1>
    {banner}
    <form method="post" action="{action}" class="space-y-3">
        {fields}
        <button type="submit" class="w-full bg-sky-600 hover:bg-sky-500 rounded px-4 py-2">{title}</button>
    </form>
    <p class="text-sm text-slate-400 mt-4">{footer}</p>
</div>"#,
        title = encode_text(title),
    );

    layout(title, &body)
}

#[must_use]
pub fn login_page(error: Option<&str>) -> String {
    auth_form(
        "Log in",
        "/login/",
        r#"<input type="text" name="username" placeholder="Username" required
       class="w-full rounded bg-slate-900 border border-slate-700 px-3 py-2">
<input type="password" name="password" placeholder="Password" required
       class="w-full rounded bg-slate-900 border border-slate-700 px-3 py-2">"#,
        r#"No account? <a href="/signup/" class="text-sky-400">Sign up</a>"#,
        error,
    )
}

#[must_use]
pub fn signup_page(error: Option<&str>) -> String {
    auth_form(
        "Sign up",
        "/signup/",
        r#"<input type="text" name="username" placeholder="Username" required
       class="w-full rounded bg-slate-900 border border-slate-700 px-3 py-2">
<input type="password" name="password" placeholder="Password" required
       class="w-full rounded bg-slate-900 border border-slate-700 px-3 py-2">
<input type="password" name="password_confirm" placeholder="Confirm password" required
       class="w-full rounded bg-slate-900 border border-slate-700 px-3 py-2">"#,
        r#"Already registered? <a href="/login/" class="text-sky-400">Log in</a>"#,
        error,
    )
}

#[must_use]
pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        r#"<div class="max-w-sm mx-auto mt-16 bg-slate-800 rounded-lg p-6">
    <h1 class="text-2xl font-bold mb-2">{title}</h1>
    <p class="text-slate-400">{message}</p>
    <a href="/" class="text-sky-400 block mt-4">Back to weather</a>
</div>"#,
        title = encode_text(title),
        message = encode_text(message),
    );

    layout(title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_vals_escapes_quotes() {
        let vals = toggle_vals("O'Fallon", "US");
        assert!(!vals.contains('\''));
        assert!(vals.contains("O&#x27;Fallon"));
    }

    #[test]
    fn save_toggle_posts_to_save_endpoint() {
        let html = save_toggle("Paris", "FR");
        assert!(html.contains(r#"hx-post="/save-favorite/""#));
        assert!(html.contains("Save Location"));
    }

    #[test]
    fn saved_toggle_posts_to_remove_endpoint() {
        let html = saved_toggle("Paris", "FR");
        assert!(html.contains(r#"hx-post="/remove-favorite/""#));
        assert!(html.contains("Saved"));
    }

    #[test]
    fn page_escapes_city_names() {
        let view = WeatherView {
            recent_searches: vec!["<script>,XX".to_string()],
            ..Default::default()
        };
        let html = weather_page(&view, None);
        assert!(!html.contains("<script>,XX"));
        assert!(html.contains("&lt;script&gt;"));
    }
}

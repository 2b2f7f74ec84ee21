use axum::{
    Form,
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{AppState, WebError, templates};
use crate::db::User;

const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Gate for routes that mutate per-user state. Requests without a session
/// user are sent to the login form.
pub async fn require_login(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let user_id = session
        .get::<i32>(SESSION_USER_KEY)
        .await
        .map_err(|e| WebError::SessionError(e.to_string()))?;

    if user_id.is_none() {
        return Err(WebError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Resolve the session's user, if any. The explicit `Option<User>` is what
/// downstream code branches on; nothing else reads the session.
pub async fn current_user(
    session: &Session,
    state: &AppState,
) -> Result<Option<User>, WebError> {
    let Some(user_id) = session
        .get::<i32>(SESSION_USER_KEY)
        .await
        .map_err(|e| WebError::SessionError(e.to_string()))?
    else {
        return Ok(None);
    };

    state
        .store()
        .get_user_by_id(user_id)
        .await
        .map_err(|e| WebError::database(e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /signup/
pub async fn signup_form() -> Html<String> {
    Html(templates::signup_page(None))
}

/// POST /signup/
/// Register a new account; on success, redirect to the login form.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<Response, WebError> {
    let username = form.username.trim();

    if let Err(message) = validate_signup(username, &form.password, &form.password_confirm) {
        return Ok(Html(templates::signup_page(Some(message))).into_response());
    }

    let created = state
        .store()
        .create_user(username, &form.password, &state.config().security)
        .await
        .map_err(|e| WebError::internal(format!("Failed to create user: {e}")))?;

    if created.is_none() {
        return Ok(Html(templates::signup_page(Some("Username is already taken"))).into_response());
    }

    tracing::info!("New user registered: {username}");

    Ok(Redirect::to("/login/").into_response())
}

fn validate_signup(
    username: &str,
    password: &str,
    password_confirm: &str,
) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("Username is required");
    }
    if username.len() > 100 {
        return Err("Username must be 100 characters or less");
    }
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    if password != password_confirm {
        return Err("Passwords do not match");
    }
    Ok(())
}

/// GET /login/
pub async fn login_form() -> Html<String> {
    Html(templates::login_page(None))
}

/// POST /login/
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    if form.username.is_empty() || form.password.is_empty() {
        return Ok(Html(templates::login_page(Some("Username and password are required")))
            .into_response());
    }

    let user = state
        .store()
        .verify_user_password(&form.username, &form.password)
        .await
        .map_err(|e| WebError::internal(format!("Authentication error: {e}")))?;

    let Some(user) = user else {
        return Ok(Html(templates::login_page(Some("Invalid credentials"))).into_response());
    };

    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| WebError::SessionError(e.to_string()))?;

    tracing::info!("User logged in: {}", user.username);

    Ok(Redirect::to("/").into_response())
}

/// POST /logout/
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_validation_rules() {
        assert!(validate_signup("ada", "longenough", "longenough").is_ok());
        assert!(validate_signup("", "longenough", "longenough").is_err());
        assert!(validate_signup("ada", "short", "short").is_err());
        assert!(validate_signup("ada", "longenough", "different").is_err());
    }
}

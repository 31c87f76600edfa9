// routes/logout.rs
// POST /logout -> clears session cookie and removes the session entry.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    routes::login::session_cookie,
    session::SessionUser,
    state::{AppState, delete_session},
};

pub async fn logout(State(st): State<Arc<AppState>>, session: SessionUser) -> Response {
    // The cookie is cleared even when the session delete fails.
    let mut response = match delete_session(&st, session.token()).await {
        Ok(()) => {
            tracing::info!(user = ?session.user_id(), "logged out");
            (StatusCode::OK, Json(json!({ "ok": true }))).into_response()
        }
        Err(e) => e.into_response(),
    };
    if let Ok(header_value) = HeaderValue::from_str(&session_cookie("", 0)) {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
    response
}

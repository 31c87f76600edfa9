// routes/login.rs
// POST /login { "email": "...", "code": "123456" } -> { "ok": true, "role": ... } + session cookie

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    session::SESSION_COOKIE_NAME,
    state::{AppState, create_session, find_user_by_email, totp_issuer},
    totp::build_totp,
};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub code: String,
}

/// Verifies the current TOTP code with a small skew (±1 step) defined in TOTP::new().
pub async fn login(
    State(st): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Response> {
    let email = body.email.trim().to_lowercase();
    let Some(user) = find_user_by_email(&st, &email).await? else {
        tracing::warn!(email = %email, "login for unknown email");
        return Err(AppError::Unauthorized);
    };
    let (Some(user_id), Some(secret)) = (user.id, user.secret.as_deref()) else {
        tracing::warn!(email = %email, "login for user without TOTP secret");
        return Err(AppError::Unauthorized);
    };

    let issuer = totp_issuer(&st).await?;
    let totp = build_totp(&issuer, &email, secret)?;
    if !totp.check_current(body.code.trim()).unwrap_or(false) {
        tracing::warn!(email = %email, "invalid TOTP code");
        return Err(AppError::Unauthorized);
    }

    let token = create_session(&st, &user_id).await?;
    let mut response = (
        StatusCode::OK,
        Json(json!({ "ok": true, "role": user.role.as_str() })),
    )
        .into_response();
    if let Ok(header_value) = HeaderValue::from_str(&session_cookie(&token, st.session_ttl_seconds)) {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
    Ok(response)
}

pub(crate) fn session_cookie(token: &str, max_age: u64) -> String {
    format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
}

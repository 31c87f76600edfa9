// routes/me.rs
// GET /me, /me/totp and /me/qrcode: the signed-in user and their enrollment.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::Response,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    routes::{helpers::UserView, qrcode::png_response},
    session::SessionUser,
    state::{AppState, enrollment_url},
};

#[derive(Serialize)]
pub struct TotpView {
    pub otpauth_url: String,
}

pub async fn me(session: SessionUser) -> Json<UserView> {
    Json(UserView::from(session.user().clone()))
}

/// Returns { otpauth_url } to enroll in authenticator apps.
pub async fn me_totp(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<TotpView>> {
    let user_id = session.user_id().copied().ok_or(AppError::Unauthorized)?;
    let otpauth_url = enrollment_url(&st, &session.caller(), &user_id).await?;
    Ok(Json(TotpView { otpauth_url }))
}

pub async fn me_qrcode(State(st): State<Arc<AppState>>, session: SessionUser) -> AppResult<Response> {
    let user_id = session.user_id().copied().ok_or(AppError::Unauthorized)?;
    let url = enrollment_url(&st, &session.caller(), &user_id).await?;
    png_response(&url)
}

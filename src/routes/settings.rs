// routes/settings.rs
// GET/PUT /api/settings

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    models::Settings,
    session::SessionUser,
    state::{AppState, get_settings, update_settings},
};

pub async fn settings_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Option<Settings>>> {
    Ok(Json(get_settings(&st, &session.caller()).await?))
}

pub async fn settings_update(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(settings): Json<Settings>,
) -> AppResult<StatusCode> {
    update_settings(&st, &session.caller(), settings).await?;
    Ok(StatusCode::NO_CONTENT)
}

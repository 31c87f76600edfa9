// routes/users.rs
// GET /api/users -> every account, admins included (admin only).

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    error::AppResult,
    routes::helpers::UserView,
    session::SessionUser,
    state::{AppState, list_users},
};

pub async fn users_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<UserView>>> {
    let users = list_users(&st, &session.caller()).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

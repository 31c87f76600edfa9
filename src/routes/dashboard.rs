// routes/dashboard.rs
// GET /api/dashboard/admin and /api/dashboard/worker/{id}, both with ?start=&end=.
// Callers without access to the admin figures get `null`, not an error.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    error::AppResult,
    routes::helpers::{RangeQuery, parse_object_id},
    session::SessionUser,
    state::{AdminStats, AppState, WorkerStats, get_admin_stats, get_worker_stats},
};

pub async fn admin_dashboard(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Query(q): Query<RangeQuery>,
) -> AppResult<Json<Option<AdminStats>>> {
    let stats = get_admin_stats(&st, &session.caller(), q.start, q.end).await?;
    Ok(Json(stats))
}

/// `{id}` is the worker's user id.
pub async fn worker_dashboard(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Query(q): Query<RangeQuery>,
) -> AppResult<Json<Option<WorkerStats>>> {
    let worker_id = parse_object_id(&id)?;
    let stats = get_worker_stats(&st, &session.caller(), &worker_id, q.start, q.end).await?;
    Ok(Json(stats))
}

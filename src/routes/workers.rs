// routes/workers.rs
// /api/workers: worker profiles and their authenticator enrollment QR.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;

use crate::{
    access::require_admin,
    error::{AppError, AppResult},
    models::{ActiveStatus, SalaryType, WorkerPatch},
    routes::{
        helpers::{CreatedView, UserView, hex, parse_object_id},
        qrcode::png_response,
    },
    session::SessionUser,
    state::{
        AppState, NewWorker, WorkerWithUser, create_worker, delete_worker, enrollment_url,
        get_worker_by_id, list_workers, update_worker,
    },
};

#[derive(Serialize)]
pub struct WorkerView {
    pub id: String,
    pub user_id: String,
    pub salary_type: SalaryType,
    pub salary_amount: f64,
    pub location: String,
    pub status: ActiveStatus,
    pub user: Option<UserView>,
}

impl From<WorkerWithUser> for WorkerView {
    fn from(row: WorkerWithUser) -> Self {
        let w = row.worker;
        WorkerView {
            id: hex(&w.id),
            user_id: w.user_id.to_hex(),
            salary_type: w.salary_type,
            salary_amount: w.salary_amount,
            location: w.location,
            status: w.status,
            user: row.user.map(UserView::from),
        }
    }
}

pub async fn workers_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<WorkerView>>> {
    let workers = list_workers(&st, &session.caller()).await?;
    Ok(Json(workers.into_iter().map(WorkerView::from).collect()))
}

pub async fn workers_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(body): Json<NewWorker>,
) -> AppResult<(StatusCode, Json<CreatedView>)> {
    let id = create_worker(&st, &session.caller(), body).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

/// `{id}` is the worker profile id.
pub async fn workers_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<WorkerView>> {
    let id = parse_object_id(&id)?;
    let worker = get_worker_by_id(&st, &session.caller(), &id)
        .await?
        .ok_or(AppError::NotFound("worker"))?;
    Ok(Json(worker.into()))
}

pub async fn workers_update(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Json(patch): Json<WorkerPatch>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    update_worker(&st, &session.caller(), &id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn workers_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_worker(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enrollment QR for a worker's authenticator app, for the admin to show
/// when handing over the account. `{id}` is the worker profile id.
pub async fn workers_qrcode(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let caller = session.caller();
    require_admin(&caller)?;
    let id = parse_object_id(&id)?;
    let worker = get_worker_by_id(&st, &caller, &id)
        .await?
        .ok_or(AppError::NotFound("worker"))?;
    let url = enrollment_url(&st, &caller, &worker.worker.user_id).await?;
    png_response(&url)
}

// routes/attendance.rs
// /api/attendance and /api/workers/{id}/attendance.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{Attendance, AttendanceStatus, WorkType},
    routes::helpers::{CreatedView, OptionalRangeQuery, clean_opt, hex, parse_object_id},
    session::SessionUser,
    state::{
        AppState, AttendanceMark, AttendanceWithWorker, delete_attendance,
        list_attendance_by_date, list_worker_attendance, mark_attendance,
    },
};

#[derive(Deserialize)]
pub struct AttendanceForm {
    pub worker_id: String,
    pub date: i64,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub trees_worked: Option<i64>,
    #[serde(default)]
    pub coconuts_harvested: Option<i64>,
    #[serde(default)]
    pub amount_earned: Option<f64>,
    #[serde(default)]
    pub work_type: Option<WorkType>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct DateQuery {
    pub date: i64,
}

#[derive(Serialize)]
pub struct AttendanceView {
    pub id: String,
    pub worker_id: String,
    pub date: i64,
    pub status: AttendanceStatus,
    pub trees_worked: Option<i64>,
    pub coconuts_harvested: Option<i64>,
    pub amount_earned: Option<f64>,
    pub work_type: Option<WorkType>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_email: Option<String>,
}

impl From<Attendance> for AttendanceView {
    fn from(a: Attendance) -> Self {
        AttendanceView {
            id: hex(&a.id),
            worker_id: a.worker_id.to_hex(),
            date: a.date,
            status: a.status,
            trees_worked: a.trees_worked,
            coconuts_harvested: a.coconuts_harvested,
            amount_earned: a.amount_earned,
            work_type: a.work_type,
            notes: a.notes,
            worker_name: None,
            worker_email: None,
        }
    }
}

impl From<AttendanceWithWorker> for AttendanceView {
    fn from(row: AttendanceWithWorker) -> Self {
        AttendanceView {
            worker_name: Some(row.worker_name),
            worker_email: row.worker_email,
            ..AttendanceView::from(row.record)
        }
    }
}

/// Marks (or re-marks) a worker for a day; returns the record id either way.
pub async fn attendance_mark(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(form): Json<AttendanceForm>,
) -> AppResult<Json<CreatedView>> {
    let mark = AttendanceMark {
        worker_id: parse_object_id(&form.worker_id)?,
        date: form.date,
        status: form.status,
        trees_worked: form.trees_worked,
        coconuts_harvested: form.coconuts_harvested,
        amount_earned: form.amount_earned,
        work_type: form.work_type,
        notes: clean_opt(form.notes),
    };
    let id = mark_attendance(&st, &session.caller(), mark).await?;
    Ok(Json(id.into()))
}

pub async fn attendance_by_date(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Query(q): Query<DateQuery>,
) -> AppResult<Json<Vec<AttendanceView>>> {
    let rows = list_attendance_by_date(&st, &session.caller(), q.date).await?;
    Ok(Json(rows.into_iter().map(AttendanceView::from).collect()))
}

pub async fn attendance_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_attendance(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `{id}` is the worker's user id; `?start=&end=` optional.
pub async fn worker_attendance(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Query(q): Query<OptionalRangeQuery>,
) -> AppResult<Json<Vec<AttendanceView>>> {
    let worker_id = parse_object_id(&id)?;
    let records = list_worker_attendance(&st, &session.caller(), &worker_id, q.range()?).await?;
    Ok(Json(records.into_iter().map(AttendanceView::from).collect()))
}

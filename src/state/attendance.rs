use mongodb::bson::{doc, oid::ObjectId, to_bson};

use crate::{
    access::{Caller, require_admin, require_admin_or_self},
    error::AppResult,
    models::{Attendance, AttendanceStatus, WorkType},
};

use super::{ACTIVITY_PAGE_SIZE, AppState, collect_all, delete_by_id, ensure_range, get_user_by_id, inserted_id};

pub const UNKNOWN_WORKER: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct AttendanceMark {
    pub worker_id: ObjectId,
    pub date: i64,
    pub status: AttendanceStatus,
    pub trees_worked: Option<i64>,
    pub coconuts_harvested: Option<i64>,
    pub amount_earned: Option<f64>,
    pub work_type: Option<WorkType>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AttendanceWithWorker {
    pub record: Attendance,
    pub worker_name: String,
    pub worker_email: Option<String>,
}

/// Upsert keyed by (worker, date): the latest mark replaces every detail of
/// an existing record, so one record per worker and day remains. Returns the
/// record id.
pub async fn mark_attendance(
    state: &AppState,
    caller: &Caller,
    mark: AttendanceMark,
) -> AppResult<ObjectId> {
    require_admin(caller)?;

    let existing = state
        .attendance
        .find_one(doc! { "worker_id": &mark.worker_id, "date": mark.date })
        .await?;

    if let Some(record) = existing.and_then(|r| r.id) {
        state
            .attendance
            .update_one(
                doc! { "_id": &record },
                doc! { "$set": {
                    "status": to_bson(&mark.status)?,
                    "trees_worked": mark.trees_worked,
                    "coconuts_harvested": mark.coconuts_harvested,
                    "amount_earned": mark.amount_earned,
                    "work_type": to_bson(&mark.work_type)?,
                    "notes": mark.notes,
                } },
            )
            .await?;
        tracing::info!(attendance = %record, worker = %mark.worker_id, "attendance updated");
        return Ok(record);
    }

    let res = state
        .attendance
        .insert_one(Attendance {
            id: None,
            worker_id: mark.worker_id,
            date: mark.date,
            status: mark.status,
            trees_worked: mark.trees_worked,
            coconuts_harvested: mark.coconuts_harvested,
            amount_earned: mark.amount_earned,
            work_type: mark.work_type,
            notes: mark.notes,
        })
        .await?;
    let id = inserted_id(&res.inserted_id, "attendance")?;
    tracing::info!(attendance = %id, worker = %mark.worker_id, "attendance marked");
    Ok(id)
}

pub async fn list_attendance_by_date(
    state: &AppState,
    caller: &Caller,
    date: i64,
) -> AppResult<Vec<AttendanceWithWorker>> {
    require_admin(caller)?;
    let cursor = state.attendance.find(doc! { "date": date }).await?;
    let records = collect_all(cursor).await?;

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let user = get_user_by_id(state, &record.worker_id).await?;
        let (worker_name, worker_email) = match user {
            Some(u) => (u.name, u.email),
            None => (UNKNOWN_WORKER.to_string(), None),
        };
        rows.push(AttendanceWithWorker {
            record,
            worker_name,
            worker_email,
        });
    }
    Ok(rows)
}

/// Attendance of one worker, newest date first; all records in the range, or
/// the latest page without one.
pub async fn list_worker_attendance(
    state: &AppState,
    caller: &Caller,
    worker_id: &ObjectId,
    range: Option<(i64, i64)>,
) -> AppResult<Vec<Attendance>> {
    require_admin_or_self(caller, worker_id)?;
    let cursor = match range {
        Some((start, end)) => {
            ensure_range(start, end)?;
            state
                .attendance
                .find(doc! { "worker_id": worker_id, "date": { "$gte": start, "$lte": end } })
                .sort(doc! { "date": -1 })
                .await?
        }
        None => {
            state
                .attendance
                .find(doc! { "worker_id": worker_id })
                .sort(doc! { "date": -1 })
                .limit(ACTIVITY_PAGE_SIZE)
                .await?
        }
    };
    collect_all(cursor).await
}

pub async fn delete_attendance(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.attendance, id, "attendance").await?;
    tracing::info!(attendance = %id, "attendance deleted");
    Ok(())
}

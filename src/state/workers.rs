use mongodb::bson::{doc, oid::ObjectId};
use serde::Deserialize;

use crate::{
    access::{Caller, require_admin, require_user},
    error::{AppError, AppResult},
    models::{ActiveStatus, SalaryType, User, UserRole, Worker, WorkerPatch},
    totp::{DEFAULT_SECRET_BYTES, generate_secret},
};

use super::{
    AppState, apply_patch, collect_all, delete_by_id, ensure_amount, find_user_by_email,
    get_user_by_id, inserted_id, is_duplicate_key,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewWorker {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
    pub location: String,
    pub salary_type: SalaryType,
    pub salary_amount: f64,
}

#[derive(Debug, Clone)]
pub struct WorkerWithUser {
    pub worker: Worker,
    pub user: Option<User>,
}

/// Creates the worker's `User` (role worker, fresh TOTP secret) and its
/// profile. Returns the profile id. Emails are unique across users. If the
/// profile insert fails the user is removed again so no orphan remains.
pub async fn create_worker(state: &AppState, caller: &Caller, input: NewWorker) -> AppResult<ObjectId> {
    require_admin(caller)?;
    ensure_amount(input.salary_amount, "salary_amount")?;
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    let email = input
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    if let Some(email) = &email {
        if find_user_by_email(state, email).await?.is_some() {
            return Err(email_taken());
        }
    }

    let res = state
        .users
        .insert_one(User {
            id: None,
            name,
            email,
            phone: Some(input.phone.trim().to_string()),
            role: UserRole::Worker,
            secret: Some(generate_secret(DEFAULT_SECRET_BYTES)),
        })
        .await
        .map_err(|e| if is_duplicate_key(&e) { email_taken() } else { e.into() })?;
    let user_id = inserted_id(&res.inserted_id, "user")?;

    let profile = state
        .workers
        .insert_one(Worker {
            id: None,
            user_id,
            salary_type: input.salary_type,
            salary_amount: input.salary_amount,
            location: input.location.trim().to_string(),
            status: ActiveStatus::Active,
        })
        .await;

    let profile = match profile {
        Ok(res) => res,
        Err(err) => {
            tracing::warn!(user = %user_id, "worker profile insert failed; removing user");
            if let Err(cleanup) = state.users.delete_one(doc! { "_id": &user_id }).await {
                tracing::error!(user = %user_id, "failed to remove orphaned user: {cleanup}");
            }
            return Err(err.into());
        }
    };
    let id = inserted_id(&profile.inserted_id, "worker")?;
    tracing::info!(worker = %id, user = %user_id, "worker created");
    Ok(id)
}

fn email_taken() -> AppError {
    AppError::Validation("email is already in use".into())
}

pub async fn list_workers(state: &AppState, caller: &Caller) -> AppResult<Vec<WorkerWithUser>> {
    require_admin(caller)?;
    let cursor = state.workers.find(doc! {}).await?;
    let workers = collect_all(cursor).await?;

    let mut rows = Vec::with_capacity(workers.len());
    for worker in workers {
        let user = get_user_by_id(state, &worker.user_id).await?;
        rows.push(WorkerWithUser { worker, user });
    }
    Ok(rows)
}

pub async fn get_worker_by_id(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
) -> AppResult<Option<WorkerWithUser>> {
    require_user(caller)?;
    let Some(worker) = state.workers.find_one(doc! { "_id": id }).await? else {
        return Ok(None);
    };
    let user = get_user_by_id(state, &worker.user_id).await?;
    Ok(Some(WorkerWithUser { worker, user }))
}

pub async fn update_worker(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
    patch: WorkerPatch,
) -> AppResult<()> {
    require_admin(caller)?;
    if let Some(amount) = patch.salary_amount {
        ensure_amount(amount, "salary_amount")?;
    }
    apply_patch(&state.workers, id, &patch, "worker").await?;
    tracing::info!(worker = %id, "worker updated");
    Ok(())
}

/// Removes the profile only; the user and its harvest, attendance and
/// payment records stay.
pub async fn delete_worker(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.workers, id, "worker").await?;
    tracing::info!(worker = %id, "worker deleted");
    Ok(())
}

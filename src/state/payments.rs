use mongodb::bson::{doc, oid::ObjectId};

use crate::{
    access::{Caller, require_admin, require_admin_or_self},
    error::AppResult,
    models::{
        RentPayment, RentPaymentPatch, RentStatus, SalaryPayment, SalaryPaymentPatch, SalaryStatus,
        TreeOwner, User,
    },
};

use super::{
    ACTIVITY_PAGE_SIZE, AppState, WORKER_PAGE_SIZE, apply_patch, collect_all, delete_by_id,
    ensure_amount, ensure_range, get_user_by_id, in_range, inserted_id,
};

#[derive(Debug, Clone)]
pub struct NewRentPayment {
    pub owner_id: ObjectId,
    pub amount: f64,
    pub payment_date: i64,
    pub due_date: i64,
    pub status: RentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSalaryPayment {
    pub worker_id: ObjectId,
    pub amount: f64,
    pub payment_date: i64,
    pub period_start: i64,
    pub period_end: i64,
    pub status: SalaryStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RentPaymentWithOwner {
    pub payment: RentPayment,
    pub owner: Option<TreeOwner>,
}

#[derive(Debug, Clone)]
pub struct SalaryPaymentWithWorker {
    pub payment: SalaryPayment,
    pub worker: Option<User>,
}

pub async fn create_rent_payment(
    state: &AppState,
    caller: &Caller,
    input: NewRentPayment,
) -> AppResult<ObjectId> {
    require_admin(caller)?;
    ensure_amount(input.amount, "amount")?;

    let res = state
        .rent_payments
        .insert_one(RentPayment {
            id: None,
            owner_id: input.owner_id,
            amount: input.amount,
            payment_date: input.payment_date,
            due_date: input.due_date,
            status: input.status,
            notes: input.notes,
        })
        .await?;
    let id = inserted_id(&res.inserted_id, "rent payment")?;
    tracing::info!(payment = %id, owner = %input.owner_id, "rent payment created");
    Ok(id)
}

pub async fn list_rent_payments(
    state: &AppState,
    caller: &Caller,
) -> AppResult<Vec<RentPaymentWithOwner>> {
    require_admin(caller)?;
    let cursor = state
        .rent_payments
        .find(doc! {})
        .sort(doc! { "_id": -1 })
        .limit(ACTIVITY_PAGE_SIZE)
        .await?;
    let payments = collect_all(cursor).await?;

    let mut rows = Vec::with_capacity(payments.len());
    for payment in payments {
        let owner = state
            .tree_owners
            .find_one(doc! { "_id": &payment.owner_id })
            .await?;
        rows.push(RentPaymentWithOwner { payment, owner });
    }
    Ok(rows)
}

pub async fn update_rent_payment(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
    patch: RentPaymentPatch,
) -> AppResult<()> {
    require_admin(caller)?;
    if let Some(amount) = patch.amount {
        ensure_amount(amount, "amount")?;
    }
    apply_patch(&state.rent_payments, id, &patch, "rent payment").await?;
    tracing::info!(payment = %id, "rent payment updated");
    Ok(())
}

pub async fn delete_rent_payment(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.rent_payments, id, "rent payment").await?;
    tracing::info!(payment = %id, "rent payment deleted");
    Ok(())
}

pub async fn create_salary_payment(
    state: &AppState,
    caller: &Caller,
    input: NewSalaryPayment,
) -> AppResult<ObjectId> {
    require_admin(caller)?;
    ensure_amount(input.amount, "amount")?;
    ensure_range(input.period_start, input.period_end)?;

    let res = state
        .salary_payments
        .insert_one(SalaryPayment {
            id: None,
            worker_id: input.worker_id,
            amount: input.amount,
            payment_date: input.payment_date,
            period_start: input.period_start,
            period_end: input.period_end,
            status: input.status,
            notes: input.notes,
        })
        .await?;
    let id = inserted_id(&res.inserted_id, "salary payment")?;
    tracing::info!(payment = %id, worker = %input.worker_id, "salary payment created");
    Ok(id)
}

pub async fn list_salary_payments(
    state: &AppState,
    caller: &Caller,
) -> AppResult<Vec<SalaryPaymentWithWorker>> {
    require_admin(caller)?;
    let cursor = state
        .salary_payments
        .find(doc! {})
        .sort(doc! { "_id": -1 })
        .limit(ACTIVITY_PAGE_SIZE)
        .await?;
    let payments = collect_all(cursor).await?;

    let mut rows = Vec::with_capacity(payments.len());
    for payment in payments {
        let worker = get_user_by_id(state, &payment.worker_id).await?;
        rows.push(SalaryPaymentWithWorker { payment, worker });
    }
    Ok(rows)
}

/// Salary payments of one worker, newest first. With a range every payment
/// dated inside it is returned; without one, the latest page.
pub async fn list_worker_salary_payments(
    state: &AppState,
    caller: &Caller,
    worker_id: &ObjectId,
    range: Option<(i64, i64)>,
) -> AppResult<Vec<SalaryPayment>> {
    require_admin_or_self(caller, worker_id)?;
    let query = state
        .salary_payments
        .find(doc! { "worker_id": worker_id })
        .sort(doc! { "_id": -1 });

    match range {
        Some((start, end)) => {
            ensure_range(start, end)?;
            let payments = collect_all(query.await?).await?;
            Ok(payments
                .into_iter()
                .filter(|p| in_range(p.payment_date, start, end))
                .collect())
        }
        None => collect_all(query.limit(WORKER_PAGE_SIZE).await?).await,
    }
}

pub async fn update_salary_payment(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
    patch: SalaryPaymentPatch,
) -> AppResult<()> {
    require_admin(caller)?;
    if let Some(amount) = patch.amount {
        ensure_amount(amount, "amount")?;
    }
    apply_patch(&state.salary_payments, id, &patch, "salary payment").await?;
    tracing::info!(payment = %id, "salary payment updated");
    Ok(())
}

pub async fn delete_salary_payment(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.salary_payments, id, "salary payment").await?;
    tracing::info!(payment = %id, "salary payment deleted");
    Ok(())
}

// routes/payments.rs
// /api/payments/rent, /api/payments/salary and /api/workers/{id}/salary-payments.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{RentPaymentPatch, RentStatus, SalaryPayment, SalaryPaymentPatch, SalaryStatus},
    routes::helpers::{
        CreatedView, OptionalRangeQuery, OwnerView, UserView, clean_opt, hex, parse_object_id,
    },
    session::SessionUser,
    state::{
        AppState, NewRentPayment, NewSalaryPayment, RentPaymentWithOwner, SalaryPaymentWithWorker,
        create_rent_payment, create_salary_payment, delete_rent_payment, delete_salary_payment,
        list_rent_payments, list_salary_payments, list_worker_salary_payments, update_rent_payment,
        update_salary_payment,
    },
};

#[derive(Deserialize)]
pub struct RentPaymentForm {
    pub owner_id: String,
    pub amount: f64,
    pub payment_date: i64,
    pub due_date: i64,
    pub status: RentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct SalaryPaymentForm {
    pub worker_id: String,
    pub amount: f64,
    pub payment_date: i64,
    pub period_start: i64,
    pub period_end: i64,
    pub status: SalaryStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct RentPaymentView {
    pub id: String,
    pub owner_id: String,
    pub amount: f64,
    pub payment_date: i64,
    pub due_date: i64,
    pub status: RentStatus,
    pub notes: Option<String>,
    pub owner: Option<OwnerView>,
}

impl From<RentPaymentWithOwner> for RentPaymentView {
    fn from(row: RentPaymentWithOwner) -> Self {
        let p = row.payment;
        RentPaymentView {
            id: hex(&p.id),
            owner_id: p.owner_id.to_hex(),
            amount: p.amount,
            payment_date: p.payment_date,
            due_date: p.due_date,
            status: p.status,
            notes: p.notes,
            owner: row.owner.map(OwnerView::from),
        }
    }
}

#[derive(Serialize)]
pub struct SalaryPaymentView {
    pub id: String,
    pub worker_id: String,
    pub amount: f64,
    pub payment_date: i64,
    pub period_start: i64,
    pub period_end: i64,
    pub status: SalaryStatus,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<UserView>,
}

impl From<SalaryPayment> for SalaryPaymentView {
    fn from(p: SalaryPayment) -> Self {
        SalaryPaymentView {
            id: hex(&p.id),
            worker_id: p.worker_id.to_hex(),
            amount: p.amount,
            payment_date: p.payment_date,
            period_start: p.period_start,
            period_end: p.period_end,
            status: p.status,
            notes: p.notes,
            worker: None,
        }
    }
}

impl From<SalaryPaymentWithWorker> for SalaryPaymentView {
    fn from(row: SalaryPaymentWithWorker) -> Self {
        SalaryPaymentView {
            worker: row.worker.map(UserView::from),
            ..SalaryPaymentView::from(row.payment)
        }
    }
}

pub async fn rent_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<RentPaymentView>>> {
    let payments = list_rent_payments(&st, &session.caller()).await?;
    Ok(Json(payments.into_iter().map(RentPaymentView::from).collect()))
}

pub async fn rent_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(form): Json<RentPaymentForm>,
) -> AppResult<(StatusCode, Json<CreatedView>)> {
    let input = NewRentPayment {
        owner_id: parse_object_id(&form.owner_id)?,
        amount: form.amount,
        payment_date: form.payment_date,
        due_date: form.due_date,
        status: form.status,
        notes: clean_opt(form.notes),
    };
    let id = create_rent_payment(&st, &session.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

pub async fn rent_update(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Json(patch): Json<RentPaymentPatch>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    update_rent_payment(&st, &session.caller(), &id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rent_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_rent_payment(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn salary_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<SalaryPaymentView>>> {
    let payments = list_salary_payments(&st, &session.caller()).await?;
    Ok(Json(payments.into_iter().map(SalaryPaymentView::from).collect()))
}

pub async fn salary_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(form): Json<SalaryPaymentForm>,
) -> AppResult<(StatusCode, Json<CreatedView>)> {
    let input = NewSalaryPayment {
        worker_id: parse_object_id(&form.worker_id)?,
        amount: form.amount,
        payment_date: form.payment_date,
        period_start: form.period_start,
        period_end: form.period_end,
        status: form.status,
        notes: clean_opt(form.notes),
    };
    let id = create_salary_payment(&st, &session.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

pub async fn salary_update(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Json(patch): Json<SalaryPaymentPatch>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    update_salary_payment(&st, &session.caller(), &id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn salary_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_salary_payment(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `{id}` is the worker's user id; `?start=&end=` optional.
pub async fn worker_salary_payments(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Query(q): Query<OptionalRangeQuery>,
) -> AppResult<Json<Vec<SalaryPaymentView>>> {
    let worker_id = parse_object_id(&id)?;
    let payments =
        list_worker_salary_payments(&st, &session.caller(), &worker_id, q.range()?).await?;
    Ok(Json(payments.into_iter().map(SalaryPaymentView::from).collect()))
}

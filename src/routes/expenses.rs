// routes/expenses.rs
// /api/expenses (admin only).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{Expense, ExpenseCategory, ExpensePatch},
    routes::helpers::{CreatedView, hex, parse_object_id},
    session::SessionUser,
    state::{
        AppState, NewExpense, create_expense, delete_expense, get_expense_by_id, list_expenses,
        update_expense,
    },
};

#[derive(Serialize)]
pub struct ExpenseView {
    pub id: String,
    pub date: i64,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub description: String,
    pub notes: Option<String>,
}

impl From<Expense> for ExpenseView {
    fn from(e: Expense) -> Self {
        ExpenseView {
            id: hex(&e.id),
            date: e.date,
            category: e.category,
            amount: e.amount,
            description: e.description,
            notes: e.notes,
        }
    }
}

pub async fn expenses_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<ExpenseView>>> {
    let expenses = list_expenses(&st, &session.caller()).await?;
    Ok(Json(expenses.into_iter().map(ExpenseView::from).collect()))
}

pub async fn expenses_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(body): Json<NewExpense>,
) -> AppResult<(StatusCode, Json<CreatedView>)> {
    let id = create_expense(&st, &session.caller(), body).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

pub async fn expenses_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<ExpenseView>> {
    let id = parse_object_id(&id)?;
    let expense = get_expense_by_id(&st, &session.caller(), &id)
        .await?
        .ok_or(AppError::NotFound("expense"))?;
    Ok(Json(expense.into()))
}

pub async fn expenses_update(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Json(patch): Json<ExpensePatch>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    update_expense(&st, &session.caller(), &id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn expenses_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_expense(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use mongodb::bson::{doc, oid::ObjectId};
use serde::Deserialize;

use crate::{
    access::{Caller, require_admin},
    error::{AppError, AppResult},
    models::{Expense, ExpenseCategory, ExpensePatch},
};

use super::{ACTIVITY_PAGE_SIZE, AppState, apply_patch, collect_all, delete_by_id, ensure_amount, inserted_id};

#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub date: i64,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn create_expense(state: &AppState, caller: &Caller, input: NewExpense) -> AppResult<ObjectId> {
    require_admin(caller)?;
    ensure_amount(input.amount, "amount")?;
    let description = input.description.trim().to_string();
    if description.is_empty() {
        return Err(AppError::Validation("description is required".into()));
    }

    let res = state
        .expenses
        .insert_one(Expense {
            id: None,
            date: input.date,
            category: input.category,
            amount: input.amount,
            description,
            notes: input.notes,
        })
        .await?;
    let id = inserted_id(&res.inserted_id, "expense")?;
    tracing::info!(expense = %id, amount = input.amount, "expense recorded");
    Ok(id)
}

pub async fn list_expenses(state: &AppState, caller: &Caller) -> AppResult<Vec<Expense>> {
    require_admin(caller)?;
    let cursor = state
        .expenses
        .find(doc! {})
        .sort(doc! { "_id": -1 })
        .limit(ACTIVITY_PAGE_SIZE)
        .await?;
    collect_all(cursor).await
}

pub async fn get_expense_by_id(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
) -> AppResult<Option<Expense>> {
    require_admin(caller)?;
    Ok(state.expenses.find_one(doc! { "_id": id }).await?)
}

pub async fn update_expense(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
    patch: ExpensePatch,
) -> AppResult<()> {
    require_admin(caller)?;
    if let Some(amount) = patch.amount {
        ensure_amount(amount, "amount")?;
    }
    apply_patch(&state.expenses, id, &patch, "expense").await?;
    tracing::info!(expense = %id, "expense updated");
    Ok(())
}

pub async fn delete_expense(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.expenses, id, "expense").await?;
    tracing::info!(expense = %id, "expense deleted");
    Ok(())
}

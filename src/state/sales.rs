use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::{
    access::{Caller, require_admin, require_user},
    error::AppResult,
    models::{Sale, StockMovement},
};

use super::{
    ACTIVITY_PAGE_SIZE, AppState, collect_all, delete_by_id, ensure_amount, ensure_count,
    ensure_range, in_range, inserted_id,
    stock::{append_history, remove_fresh},
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
    pub date: i64,
    pub quantity_sold: i64,
    pub rate_per_coconut: f64,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesStats {
    pub total_revenue: f64,
    pub total_quantity: i64,
    pub sales_count: usize,
    pub average_rate: f64,
}

pub fn sale_revenue(quantity_sold: i64, rate_per_coconut: f64) -> f64 {
    quantity_sold as f64 * rate_per_coconut
}

/// Records a sale, lowers fresh stock (never below zero) and logs an "out"
/// ledger entry referencing the sale.
pub async fn create_sale(state: &AppState, caller: &Caller, input: NewSale) -> AppResult<ObjectId> {
    require_admin(caller)?;
    ensure_count(input.quantity_sold, "quantity_sold")?;
    ensure_amount(input.rate_per_coconut, "rate_per_coconut")?;

    let total_revenue = sale_revenue(input.quantity_sold, input.rate_per_coconut);
    let res = state
        .sales
        .insert_one(Sale {
            id: None,
            date: input.date,
            quantity_sold: input.quantity_sold,
            rate_per_coconut: input.rate_per_coconut,
            total_revenue,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            notes: input.notes,
        })
        .await?;
    let sale_id = inserted_id(&res.inserted_id, "sale")?;

    remove_fresh(state, input.quantity_sold).await?;
    append_history(
        state,
        input.date,
        StockMovement::Out,
        input.quantity_sold,
        "Sale".to_string(),
        Some(sale_id.to_hex()),
    )
    .await?;

    tracing::info!(sale = %sale_id, quantity = input.quantity_sold, total_revenue, "sale recorded");
    Ok(sale_id)
}

pub async fn list_sales(state: &AppState, caller: &Caller) -> AppResult<Vec<Sale>> {
    require_user(caller)?;
    let cursor = state
        .sales
        .find(doc! {})
        .sort(doc! { "_id": -1 })
        .limit(ACTIVITY_PAGE_SIZE)
        .await?;
    collect_all(cursor).await
}

pub async fn get_sale_by_id(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<Option<Sale>> {
    require_user(caller)?;
    Ok(state.sales.find_one(doc! { "_id": id }).await?)
}

pub async fn get_sales_stats(
    state: &AppState,
    caller: &Caller,
    start: i64,
    end: i64,
) -> AppResult<SalesStats> {
    require_admin(caller)?;
    ensure_range(start, end)?;
    let cursor = state.sales.find(doc! {}).await?;
    let sales = collect_all(cursor).await?;
    Ok(summarize_sales(&sales, start, end))
}

/// Removes the sale record; stock and ledger are not reversed.
pub async fn delete_sale(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.sales, id, "sale").await?;
    tracing::info!(sale = %id, "sale deleted");
    Ok(())
}

pub fn summarize_sales(sales: &[Sale], start: i64, end: i64) -> SalesStats {
    let (total_revenue, total_quantity, sales_count) = sales
        .iter()
        .filter(|s| in_range(s.date, start, end))
        .fold((0.0, 0_i64, 0_usize), |(rev, qty, n), s| {
            (rev + s.total_revenue, qty + s.quantity_sold, n + 1)
        });
    SalesStats {
        total_revenue,
        total_quantity,
        sales_count,
        average_rate: if total_quantity > 0 {
            total_revenue / total_quantity as f64
        } else {
            0.0
        },
    }
}

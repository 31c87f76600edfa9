// Dashboard statistics: linear filter-and-sum reductions over the collections,
// with inclusive date ranges.

use mongodb::bson::{doc, oid::ObjectId};
use serde::Serialize;

use crate::{
    access::{Caller, require_admin_or_self},
    error::AppResult,
    models::{
        ActiveStatus, CoconutTree, Expense, Harvest, RentPayment, RentStatus, SalaryPayment,
        SalaryStatus, Sale, Stock, Worker,
    },
};

use super::{AppState, SINGLETON_KEY, collect_all, ensure_range, in_range};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialTotals {
    pub total_revenue: f64,
    pub total_rent_paid: f64,
    pub total_salary_paid: f64,
    pub total_expenses: f64,
    pub total_costs: f64,
    pub profit: f64,
    pub sales_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    #[serde(flatten)]
    pub totals: FinancialTotals,
    pub current_stock: Option<Stock>,
    pub active_trees: usize,
    pub total_owners: u64,
    pub active_workers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkerStats {
    pub total_coconuts: i64,
    /// Number of in-range harvests cut by the worker, not distinct trees.
    pub trees_worked: usize,
    pub total_earned: f64,
    pub pending_payments: f64,
    pub harvest_count: usize,
}

/// Business-wide statistics for `[start, end]`. Non-admin and anonymous
/// callers get `None` instead of an error.
pub async fn get_admin_stats(
    state: &AppState,
    caller: &Caller,
    start: i64,
    end: i64,
) -> AppResult<Option<AdminStats>> {
    if !caller.is_admin() {
        tracing::warn!(user = ?caller.user_id(), "non-admin requested admin stats");
        return Ok(None);
    }
    ensure_range(start, end)?;

    let sales: Vec<Sale> = collect_all(state.sales.find(doc! {}).await?).await?;
    let rent: Vec<RentPayment> = collect_all(state.rent_payments.find(doc! {}).await?).await?;
    let salary: Vec<SalaryPayment> = collect_all(state.salary_payments.find(doc! {}).await?).await?;
    let expenses: Vec<Expense> = collect_all(state.expenses.find(doc! {}).await?).await?;
    let trees: Vec<CoconutTree> = collect_all(state.coconut_trees.find(doc! {}).await?).await?;
    let workers: Vec<Worker> = collect_all(state.workers.find(doc! {}).await?).await?;
    let total_owners = state.tree_owners.count_documents(doc! {}).await?;
    let current_stock = state.stock.find_one(doc! { "_id": SINGLETON_KEY }).await?;

    Ok(Some(AdminStats {
        totals: financial_totals(&sales, &rent, &salary, &expenses, start, end),
        current_stock,
        active_trees: trees.iter().filter(|t| t.status == ActiveStatus::Active).count(),
        total_owners,
        active_workers: workers.iter().filter(|w| w.status == ActiveStatus::Active).count(),
    }))
}

/// Statistics for one worker (`worker_id` is the worker's user id). Anonymous
/// callers get `None`; a worker asking about someone else is rejected.
pub async fn get_worker_stats(
    state: &AppState,
    caller: &Caller,
    worker_id: &ObjectId,
    start: i64,
    end: i64,
) -> AppResult<Option<WorkerStats>> {
    if caller.user().is_none() {
        return Ok(None);
    }
    require_admin_or_self(caller, worker_id)?;
    ensure_range(start, end)?;

    let harvests: Vec<Harvest> = collect_all(
        state
            .harvests
            .find(doc! { "cutter_worker_id": worker_id })
            .await?,
    )
    .await?;
    let payments: Vec<SalaryPayment> = collect_all(
        state
            .salary_payments
            .find(doc! { "worker_id": worker_id })
            .await?,
    )
    .await?;

    Ok(Some(worker_totals(&harvests, &payments, start, end)))
}

pub fn financial_totals(
    sales: &[Sale],
    rent: &[RentPayment],
    salary: &[SalaryPayment],
    expenses: &[Expense],
    start: i64,
    end: i64,
) -> FinancialTotals {
    let in_range_sales: Vec<&Sale> = sales.iter().filter(|s| in_range(s.date, start, end)).collect();
    let total_revenue: f64 = in_range_sales.iter().map(|s| s.total_revenue).sum();

    let total_rent_paid: f64 = rent
        .iter()
        .filter(|r| r.status == RentStatus::Paid && in_range(r.payment_date, start, end))
        .map(|r| r.amount)
        .sum();
    let total_salary_paid: f64 = salary
        .iter()
        .filter(|s| s.status == SalaryStatus::Paid && in_range(s.payment_date, start, end))
        .map(|s| s.amount)
        .sum();
    let total_expenses: f64 = expenses
        .iter()
        .filter(|e| in_range(e.date, start, end))
        .map(|e| e.amount)
        .sum();

    let total_costs = total_rent_paid + total_salary_paid + total_expenses;
    FinancialTotals {
        total_revenue,
        total_rent_paid,
        total_salary_paid,
        total_expenses,
        total_costs,
        profit: total_revenue - total_costs,
        sales_count: in_range_sales.len(),
    }
}

// Pending payments are summed over every date, unlike earnings.
pub fn worker_totals(
    harvests: &[Harvest],
    payments: &[SalaryPayment],
    start: i64,
    end: i64,
) -> WorkerStats {
    let in_range_harvests: Vec<&Harvest> = harvests
        .iter()
        .filter(|h| in_range(h.date_cut, start, end))
        .collect();

    WorkerStats {
        total_coconuts: in_range_harvests.iter().map(|h| h.total_coconuts).sum(),
        trees_worked: in_range_harvests.len(),
        total_earned: payments
            .iter()
            .filter(|p| p.status == SalaryStatus::Paid && in_range(p.payment_date, start, end))
            .map(|p| p.amount)
            .sum(),
        pending_payments: payments
            .iter()
            .filter(|p| p.status == SalaryStatus::Pending)
            .map(|p| p.amount)
            .sum(),
        harvest_count: in_range_harvests.len(),
    }
}

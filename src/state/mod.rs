// state module: AppState, initialization, shared helpers, and re-exports of
// the per-entity operation modules.

use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::{
    Client, Collection, Cursor,
    bson::{doc, oid::ObjectId, to_document},
    error::{ErrorKind, WriteFailure},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        Attendance, CoconutTree, Expense, Harvest, RentPayment, SalaryPayment, Sale, Session,
        Settings, Stock, StockHistory, TreeOwner, User, Worker,
    },
};

mod seed;
mod users;
mod owners;
mod trees;
mod workers;
mod harvests;
mod sales;
mod payments;
mod attendance;
mod stock;
mod expenses;
mod settings;
mod dashboard;

pub use users::*;
pub use owners::*;
pub use trees::*;
pub use workers::*;
pub use harvests::*;
pub use sales::*;
pub use payments::*;
pub use attendance::*;
pub use stock::*;
pub use expenses::*;
pub use settings::*;
pub use dashboard::*;

/// Fixed `_id` of the Stock and Settings singletons.
pub const SINGLETON_KEY: &str = "current";
/// Page size for newest-first activity logs.
pub const ACTIVITY_PAGE_SIZE: i64 = 100;
/// Page size for per-worker harvest and salary listings.
pub const WORKER_PAGE_SIZE: i64 = 50;
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;
pub const HARVEST_INTERVAL_DAYS: i64 = 45;

#[derive(Clone)]
pub struct AppState {
    pub users: Collection<User>,
    pub sessions: Collection<Session>,
    pub tree_owners: Collection<TreeOwner>,
    pub coconut_trees: Collection<CoconutTree>,
    pub workers: Collection<Worker>,
    pub harvests: Collection<Harvest>,
    pub attendance: Collection<Attendance>,
    pub stock: Collection<Stock>,
    pub stock_history: Collection<StockHistory>,
    pub sales: Collection<Sale>,
    pub rent_payments: Collection<RentPayment>,
    pub salary_payments: Collection<SalaryPayment>,
    pub expenses: Collection<Expense>,
    pub settings: Collection<Settings>,
    pub session_ttl_seconds: u64,
}

pub async fn init_state(config: &Config) -> Result<AppState> {
    let client = Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("invalid MongoDB connection string")?;
    let db = client.database(&config.mongodb_db);

    seed::ensure_collections(&db).await?;
    seed::ensure_indexes(&db).await?;

    // Only bootstrap an admin when nobody can log in yet.
    if seed::is_database_empty(&db).await? {
        seed::seed_admin(&db, config).await?;
    }

    tracing::info!(db = %config.mongodb_db, "MongoDB state initialized");

    Ok(AppState {
        users: db.collection::<User>("users"),
        sessions: db.collection::<Session>("sessions"),
        tree_owners: db.collection::<TreeOwner>("tree_owners"),
        coconut_trees: db.collection::<CoconutTree>("coconut_trees"),
        workers: db.collection::<Worker>("workers"),
        harvests: db.collection::<Harvest>("harvests"),
        attendance: db.collection::<Attendance>("attendance"),
        stock: db.collection::<Stock>("stock"),
        stock_history: db.collection::<StockHistory>("stock_history"),
        sales: db.collection::<Sale>("sales"),
        rent_payments: db.collection::<RentPayment>("rent_payments"),
        salary_payments: db.collection::<SalaryPayment>("salary_payments"),
        expenses: db.collection::<Expense>("expenses"),
        settings: db.collection::<Settings>("settings"),
        session_ttl_seconds: config.session_ttl_seconds,
    })
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Inclusive date-range check used by listings and statistics.
pub(crate) fn in_range(value: i64, start: i64, end: i64) -> bool {
    value >= start && value <= end
}

pub(crate) fn inserted_id(id: &mongodb::bson::Bson, what: &'static str) -> AppResult<ObjectId> {
    id.as_object_id()
        .with_context(|| format!("{what} insert missing _id"))
        .map_err(Into::into)
}

/// True when a write was rejected by a unique index.
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == 11000
    )
}

pub(crate) async fn collect_all<T>(mut cursor: Cursor<T>) -> AppResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = Vec::new();
    while let Some(item) = cursor.try_next().await? {
        items.push(item);
    }
    Ok(items)
}

/// Merges the serialized patch into the document; `None` fields are absent
/// from the patch and stay untouched.
pub(crate) async fn apply_patch<T, P>(
    collection: &Collection<T>,
    id: &ObjectId,
    patch: &P,
    what: &'static str,
) -> AppResult<()>
where
    T: Send + Sync,
    P: Serialize,
{
    let set = to_document(patch)?;
    let matched = if set.is_empty() {
        collection.count_documents(doc! { "_id": id }).await?
    } else {
        collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?
            .matched_count
    };
    if matched == 0 {
        return Err(AppError::NotFound(what));
    }
    Ok(())
}

pub(crate) async fn delete_by_id<T>(
    collection: &Collection<T>,
    id: &ObjectId,
    what: &'static str,
) -> AppResult<()>
where
    T: Send + Sync,
{
    let res = collection.delete_one(doc! { "_id": id }).await?;
    if res.deleted_count == 0 {
        return Err(AppError::NotFound(what));
    }
    Ok(())
}

pub(crate) fn ensure_count(value: i64, field: &str) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

pub(crate) fn ensure_amount(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_range(start: i64, end: i64) -> AppResult<()> {
    if start > end {
        return Err(AppError::Validation(
            "start date must not be after end date".into(),
        ));
    }
    Ok(())
}

use mongodb::{
    bson::{Document, doc},
    options::ReturnDocument,
};

use crate::{
    access::{Caller, require_admin, require_user},
    error::{AppError, AppResult},
    models::{Stock, StockHistory, StockMovement, StockPatch},
};

use super::{ACTIVITY_PAGE_SIZE, AppState, SINGLETON_KEY, collect_all, ensure_count, inserted_id, now_millis};

pub async fn get_current_stock(state: &AppState, caller: &Caller) -> AppResult<Option<Stock>> {
    require_user(caller)?;
    Ok(state.stock.find_one(doc! { "_id": SINGLETON_KEY }).await?)
}

/// Overwrites the supplied counters. A missing singleton is created with zero
/// for every counter left out of the patch.
pub async fn update_stock(state: &AppState, caller: &Caller, patch: StockPatch) -> AppResult<()> {
    require_admin(caller)?;

    let mut set = Document::new();
    let mut on_insert = Document::new();
    for (field, value) in [
        ("fresh_coconuts", patch.fresh_coconuts),
        ("old_stock", patch.old_stock),
        ("damaged_coconuts", patch.damaged_coconuts),
    ] {
        match value {
            Some(v) => {
                ensure_count(v, field)?;
                set.insert(field, v);
            }
            None => {
                on_insert.insert(field, 0_i64);
            }
        }
    }
    set.insert("last_updated", now_millis());

    let mut update = doc! { "$set": set };
    if !on_insert.is_empty() {
        update.insert("$setOnInsert", on_insert);
    }
    state
        .stock
        .update_one(doc! { "_id": SINGLETON_KEY }, update)
        .upsert(true)
        .await?;
    tracing::info!("stock counters updated manually");
    Ok(())
}

/// Moves up to `quantity` fresh coconuts to damaged and logs a wastage entry
/// for the amount actually moved.
pub async fn record_wastage(
    state: &AppState,
    caller: &Caller,
    quantity: i64,
    date: i64,
    reason: Option<String>,
) -> AppResult<()> {
    require_admin(caller)?;
    ensure_count(quantity, "quantity")?;

    let before = state
        .stock
        .find_one_and_update(
            doc! { "_id": SINGLETON_KEY },
            vec![doc! { "$set": {
                "damaged_coconuts": { "$add": [
                    "$damaged_coconuts",
                    { "$min": [quantity, "$fresh_coconuts"] }
                ] },
                "fresh_coconuts": { "$max": [0_i64, { "$subtract": ["$fresh_coconuts", quantity] }] },
                "last_updated": now_millis(),
            } }],
        )
        .return_document(ReturnDocument::Before)
        .await?
        .ok_or(AppError::NotFound("stock"))?;
    let moved = quantity.min(before.fresh_coconuts.max(0));

    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "Wastage".to_string());
    append_history(state, date, StockMovement::Wastage, moved, reason, None).await?;
    tracing::info!(requested = quantity, moved, "wastage recorded");
    Ok(())
}

pub async fn list_stock_history(state: &AppState, caller: &Caller) -> AppResult<Vec<StockHistory>> {
    require_user(caller)?;
    let cursor = state
        .stock_history
        .find(doc! {})
        .sort(doc! { "_id": -1 })
        .limit(ACTIVITY_PAGE_SIZE)
        .await?;
    collect_all(cursor).await
}

/// Atomic increment of fresh coconuts; creates the singleton on first harvest.
pub(super) async fn add_fresh(state: &AppState, quantity: i64) -> AppResult<()> {
    state
        .stock
        .update_one(
            doc! { "_id": SINGLETON_KEY },
            doc! {
                "$inc": { "fresh_coconuts": quantity },
                "$set": { "last_updated": now_millis() },
                "$setOnInsert": { "old_stock": 0_i64, "damaged_coconuts": 0_i64 },
            },
        )
        .upsert(true)
        .await?;
    Ok(())
}

/// Atomic decrement of fresh coconuts, floored at zero. Without a singleton
/// there is nothing to decrement and no row is created.
pub(super) async fn remove_fresh(state: &AppState, quantity: i64) -> AppResult<()> {
    state
        .stock
        .update_one(
            doc! { "_id": SINGLETON_KEY },
            vec![doc! { "$set": {
                "fresh_coconuts": { "$max": [0_i64, { "$subtract": ["$fresh_coconuts", quantity] }] },
                "last_updated": now_millis(),
            } }],
        )
        .await?;
    Ok(())
}

pub(super) async fn append_history(
    state: &AppState,
    date: i64,
    kind: StockMovement,
    quantity: i64,
    reason: String,
    reference_id: Option<String>,
) -> AppResult<()> {
    let res = state
        .stock_history
        .insert_one(StockHistory {
            id: None,
            date,
            kind,
            quantity,
            reason,
            reference_id,
        })
        .await?;
    inserted_id(&res.inserted_id, "stock history")?;
    Ok(())
}

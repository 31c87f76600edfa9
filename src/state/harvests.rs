use mongodb::bson::{doc, oid::ObjectId};

use crate::{
    access::{Caller, require_admin, require_user},
    error::{AppError, AppResult},
    models::{CoconutTree, Harvest, StockMovement, User},
};

use super::{
    ACTIVITY_PAGE_SIZE, AppState, DAY_MILLIS, HARVEST_INTERVAL_DAYS, WORKER_PAGE_SIZE,
    collect_all, delete_by_id, ensure_count, get_user_by_id, inserted_id,
    stock::{add_fresh, append_history},
};

#[derive(Debug, Clone)]
pub struct NewHarvest {
    pub tree_id: ObjectId,
    pub date_cut: i64,
    pub total_coconuts: i64,
    pub cutter_worker_id: ObjectId,
    pub picker_worker_id: Option<ObjectId>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HarvestWithRefs {
    pub harvest: Harvest,
    pub tree: Option<CoconutTree>,
    pub cutter: Option<User>,
    pub picker: Option<User>,
}

/// Date the tree is due for its next cut after being cut at `date_cut`.
pub fn next_cut_date(date_cut: i64) -> AppResult<i64> {
    date_cut
        .checked_add(HARVEST_INTERVAL_DAYS * DAY_MILLIS)
        .ok_or_else(|| AppError::Validation("date_cut is out of range".into()))
}

/// Records a harvest and its effects: the tree's cut dates, the fresh stock
/// count and an "in" ledger entry referencing the harvest.
pub async fn create_harvest(
    state: &AppState,
    caller: &Caller,
    input: NewHarvest,
) -> AppResult<ObjectId> {
    require_admin(caller)?;
    ensure_count(input.total_coconuts, "total_coconuts")?;
    let next_cut = next_cut_date(input.date_cut)?;
    if state
        .coconut_trees
        .find_one(doc! { "_id": &input.tree_id })
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("tree"));
    }

    let res = state
        .harvests
        .insert_one(Harvest {
            id: None,
            tree_id: input.tree_id,
            date_cut: input.date_cut,
            total_coconuts: input.total_coconuts,
            cutter_worker_id: input.cutter_worker_id,
            picker_worker_id: input.picker_worker_id,
            notes: input.notes,
        })
        .await?;
    let harvest_id = inserted_id(&res.inserted_id, "harvest")?;

    state
        .coconut_trees
        .update_one(
            doc! { "_id": &input.tree_id },
            doc! { "$set": {
                "last_cut_date": input.date_cut,
                "next_cut_date": next_cut,
            } },
        )
        .await?;

    add_fresh(state, input.total_coconuts).await?;
    append_history(
        state,
        input.date_cut,
        StockMovement::In,
        input.total_coconuts,
        "Harvest".to_string(),
        Some(harvest_id.to_hex()),
    )
    .await?;

    tracing::info!(
        harvest = %harvest_id,
        tree = %input.tree_id,
        coconuts = input.total_coconuts,
        "harvest recorded"
    );
    Ok(harvest_id)
}

pub async fn list_harvests(state: &AppState, caller: &Caller) -> AppResult<Vec<HarvestWithRefs>> {
    require_user(caller)?;
    let cursor = state
        .harvests
        .find(doc! {})
        .sort(doc! { "_id": -1 })
        .limit(ACTIVITY_PAGE_SIZE)
        .await?;
    let harvests = collect_all(cursor).await?;

    let mut rows = Vec::with_capacity(harvests.len());
    for harvest in harvests {
        rows.push(resolve_refs(state, harvest, true).await?);
    }
    Ok(rows)
}

pub async fn get_harvest_by_id(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
) -> AppResult<Option<HarvestWithRefs>> {
    require_user(caller)?;
    match state.harvests.find_one(doc! { "_id": id }).await? {
        Some(harvest) => resolve_refs(state, harvest, true).await.map(Some),
        None => Ok(None),
    }
}

/// Latest harvests where `worker_id` (a user id) was the cutter.
pub async fn list_harvests_by_worker(
    state: &AppState,
    caller: &Caller,
    worker_id: &ObjectId,
) -> AppResult<Vec<HarvestWithRefs>> {
    require_user(caller)?;
    let cursor = state
        .harvests
        .find(doc! { "cutter_worker_id": worker_id })
        .sort(doc! { "_id": -1 })
        .limit(WORKER_PAGE_SIZE)
        .await?;
    let harvests = collect_all(cursor).await?;

    let mut rows = Vec::with_capacity(harvests.len());
    for harvest in harvests {
        rows.push(resolve_refs(state, harvest, false).await?);
    }
    Ok(rows)
}

/// Deletes the harvest record only; stock and ledger are not reversed.
pub async fn delete_harvest(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.harvests, id, "harvest").await?;
    tracing::info!(harvest = %id, "harvest deleted");
    Ok(())
}

async fn resolve_refs(
    state: &AppState,
    harvest: Harvest,
    with_workers: bool,
) -> AppResult<HarvestWithRefs> {
    let tree = state
        .coconut_trees
        .find_one(doc! { "_id": &harvest.tree_id })
        .await?;
    let (cutter, picker) = if with_workers {
        let cutter = get_user_by_id(state, &harvest.cutter_worker_id).await?;
        let picker = match &harvest.picker_worker_id {
            Some(id) => get_user_by_id(state, id).await?,
            None => None,
        };
        (cutter, picker)
    } else {
        (None, None)
    };
    Ok(HarvestWithRefs {
        harvest,
        tree,
        cutter,
        picker,
    })
}

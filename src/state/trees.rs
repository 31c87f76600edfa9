use mongodb::bson::{doc, oid::ObjectId};

use crate::{
    access::{Caller, require_admin, require_user},
    error::AppResult,
    models::{ActiveStatus, CoconutTree, CoconutTreePatch, TreeOwner, User},
};

use super::{
    AppState, apply_patch, collect_all, delete_by_id, ensure_amount, ensure_count, get_user_by_id,
    inserted_id,
};

#[derive(Debug, Clone)]
pub struct NewCoconutTree {
    pub tree_id: String,
    pub owner_id: ObjectId,
    pub location: String,
    pub rent_per_year: f64,
    pub expected_coconuts_count: i64,
    pub assigned_worker_id: Option<ObjectId>,
}

/// A tree with its owner and assigned worker resolved for display. Either
/// reference is `None` when it was never set or has since been deleted.
#[derive(Debug, Clone)]
pub struct TreeWithRefs {
    pub tree: CoconutTree,
    pub owner: Option<TreeOwner>,
    pub worker: Option<User>,
}

pub async fn create_tree(
    state: &AppState,
    caller: &Caller,
    input: NewCoconutTree,
) -> AppResult<ObjectId> {
    require_admin(caller)?;
    ensure_amount(input.rent_per_year, "rent_per_year")?;
    ensure_count(input.expected_coconuts_count, "expected_coconuts_count")?;

    let res = state
        .coconut_trees
        .insert_one(CoconutTree {
            id: None,
            tree_id: input.tree_id.trim().to_string(),
            owner_id: input.owner_id,
            location: input.location.trim().to_string(),
            rent_per_year: input.rent_per_year,
            expected_coconuts_count: input.expected_coconuts_count,
            last_cut_date: None,
            next_cut_date: None,
            assigned_worker_id: input.assigned_worker_id,
            status: ActiveStatus::Active,
        })
        .await?;
    let id = inserted_id(&res.inserted_id, "tree")?;
    tracing::info!(tree = %id, owner = %input.owner_id, "tree created");
    Ok(id)
}

pub async fn list_trees(state: &AppState, caller: &Caller) -> AppResult<Vec<TreeWithRefs>> {
    require_user(caller)?;
    let cursor = state.coconut_trees.find(doc! {}).await?;
    let trees = collect_all(cursor).await?;

    let mut rows = Vec::with_capacity(trees.len());
    for tree in trees {
        rows.push(resolve_refs(state, tree, true).await?);
    }
    Ok(rows)
}

pub async fn get_tree_by_id(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
) -> AppResult<Option<TreeWithRefs>> {
    require_user(caller)?;
    match state.coconut_trees.find_one(doc! { "_id": id }).await? {
        Some(tree) => resolve_refs(state, tree, true).await.map(Some),
        None => Ok(None),
    }
}

/// Trees assigned to a worker (`worker_id` is the worker's user id), with owners.
pub async fn list_trees_by_worker(
    state: &AppState,
    caller: &Caller,
    worker_id: &ObjectId,
) -> AppResult<Vec<TreeWithRefs>> {
    require_user(caller)?;
    let cursor = state
        .coconut_trees
        .find(doc! { "assigned_worker_id": worker_id })
        .await?;
    let trees = collect_all(cursor).await?;

    let mut rows = Vec::with_capacity(trees.len());
    for tree in trees {
        rows.push(resolve_refs(state, tree, false).await?);
    }
    Ok(rows)
}

pub async fn update_tree(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
    patch: CoconutTreePatch,
) -> AppResult<()> {
    require_admin(caller)?;
    if let Some(rent) = patch.rent_per_year {
        ensure_amount(rent, "rent_per_year")?;
    }
    if let Some(expected) = patch.expected_coconuts_count {
        ensure_count(expected, "expected_coconuts_count")?;
    }
    apply_patch(&state.coconut_trees, id, &patch, "tree").await?;
    tracing::info!(tree = %id, "tree updated");
    Ok(())
}

pub async fn delete_tree(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.coconut_trees, id, "tree").await?;
    tracing::info!(tree = %id, "tree deleted");
    Ok(())
}

async fn resolve_refs(
    state: &AppState,
    tree: CoconutTree,
    with_worker: bool,
) -> AppResult<TreeWithRefs> {
    let owner = state
        .tree_owners
        .find_one(doc! { "_id": &tree.owner_id })
        .await?;
    let worker = match (&tree.assigned_worker_id, with_worker) {
        (Some(uid), true) => get_user_by_id(state, uid).await?,
        _ => None,
    };
    Ok(TreeWithRefs {
        tree,
        owner,
        worker,
    })
}

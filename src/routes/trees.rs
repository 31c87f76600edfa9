// routes/trees.rs
// /api/trees and /api/workers/{id}/trees.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{ActiveStatus, CoconutTreePatch},
    routes::helpers::{
        CreatedView, OwnerView, UserView, clean_opt, hex, parse_object_id, parse_opt_object_id,
    },
    session::SessionUser,
    state::{
        AppState, NewCoconutTree, TreeWithRefs, create_tree, delete_tree, get_tree_by_id,
        list_trees, list_trees_by_worker, update_tree,
    },
};

#[derive(Deserialize)]
pub struct TreeForm {
    pub tree_id: String,
    pub owner_id: String,
    pub location: String,
    pub rent_per_year: f64,
    pub expected_coconuts_count: i64,
    #[serde(default)]
    pub assigned_worker_id: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct TreePatchForm {
    pub tree_id: Option<String>,
    pub owner_id: Option<String>,
    pub location: Option<String>,
    pub rent_per_year: Option<f64>,
    pub expected_coconuts_count: Option<i64>,
    pub last_cut_date: Option<i64>,
    pub next_cut_date: Option<i64>,
    pub assigned_worker_id: Option<String>,
    pub status: Option<ActiveStatus>,
}

#[derive(Serialize)]
pub struct TreeView {
    pub id: String,
    pub tree_id: String,
    pub owner_id: String,
    pub location: String,
    pub rent_per_year: f64,
    pub expected_coconuts_count: i64,
    pub last_cut_date: Option<i64>,
    pub next_cut_date: Option<i64>,
    pub assigned_worker_id: Option<String>,
    pub status: ActiveStatus,
    pub owner: Option<OwnerView>,
    pub worker: Option<UserView>,
}

impl From<TreeWithRefs> for TreeView {
    fn from(row: TreeWithRefs) -> Self {
        let t = row.tree;
        TreeView {
            id: hex(&t.id),
            tree_id: t.tree_id,
            owner_id: t.owner_id.to_hex(),
            location: t.location,
            rent_per_year: t.rent_per_year,
            expected_coconuts_count: t.expected_coconuts_count,
            last_cut_date: t.last_cut_date,
            next_cut_date: t.next_cut_date,
            assigned_worker_id: t.assigned_worker_id.map(|id| id.to_hex()),
            status: t.status,
            owner: row.owner.map(OwnerView::from),
            worker: row.worker.map(UserView::from),
        }
    }
}

pub async fn trees_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<TreeView>>> {
    let trees = list_trees(&st, &session.caller()).await?;
    Ok(Json(trees.into_iter().map(TreeView::from).collect()))
}

pub async fn trees_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(form): Json<TreeForm>,
) -> AppResult<(StatusCode, Json<CreatedView>)> {
    let input = NewCoconutTree {
        tree_id: form.tree_id,
        owner_id: parse_object_id(&form.owner_id)?,
        location: form.location,
        rent_per_year: form.rent_per_year,
        expected_coconuts_count: form.expected_coconuts_count,
        assigned_worker_id: parse_opt_object_id(form.assigned_worker_id.as_deref())?,
    };
    let id = create_tree(&st, &session.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

pub async fn trees_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<TreeView>> {
    let id = parse_object_id(&id)?;
    let tree = get_tree_by_id(&st, &session.caller(), &id)
        .await?
        .ok_or(AppError::NotFound("tree"))?;
    Ok(Json(tree.into()))
}

pub async fn trees_update(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Json(form): Json<TreePatchForm>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    let patch = CoconutTreePatch {
        tree_id: clean_opt(form.tree_id),
        owner_id: parse_opt_object_id(form.owner_id.as_deref())?,
        location: clean_opt(form.location),
        rent_per_year: form.rent_per_year,
        expected_coconuts_count: form.expected_coconuts_count,
        last_cut_date: form.last_cut_date,
        next_cut_date: form.next_cut_date,
        assigned_worker_id: parse_opt_object_id(form.assigned_worker_id.as_deref())?,
        status: form.status,
    };
    update_tree(&st, &session.caller(), &id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn trees_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_tree(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `{id}` is the worker's user id.
pub async fn worker_trees(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<TreeView>>> {
    let worker_id = parse_object_id(&id)?;
    let trees = list_trees_by_worker(&st, &session.caller(), &worker_id).await?;
    Ok(Json(trees.into_iter().map(TreeView::from).collect()))
}

// routes/harvests.rs
// /api/harvests and /api/workers/{id}/harvests.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    routes::helpers::{CreatedView, UserView, clean_opt, hex, parse_object_id, parse_opt_object_id},
    session::SessionUser,
    state::{
        AppState, HarvestWithRefs, NewHarvest, create_harvest, delete_harvest, get_harvest_by_id,
        list_harvests, list_harvests_by_worker,
    },
};

#[derive(Deserialize)]
pub struct HarvestForm {
    pub tree_id: String,
    pub date_cut: i64,
    pub total_coconuts: i64,
    pub cutter_worker_id: String,
    #[serde(default)]
    pub picker_worker_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct HarvestTreeView {
    pub id: String,
    pub tree_id: String,
    pub location: String,
}

#[derive(Serialize)]
pub struct HarvestView {
    pub id: String,
    pub tree_id: String,
    pub date_cut: i64,
    pub total_coconuts: i64,
    pub cutter_worker_id: String,
    pub picker_worker_id: Option<String>,
    pub notes: Option<String>,
    pub tree: Option<HarvestTreeView>,
    pub cutter: Option<UserView>,
    pub picker: Option<UserView>,
}

impl From<HarvestWithRefs> for HarvestView {
    fn from(row: HarvestWithRefs) -> Self {
        let h = row.harvest;
        HarvestView {
            id: hex(&h.id),
            tree_id: h.tree_id.to_hex(),
            date_cut: h.date_cut,
            total_coconuts: h.total_coconuts,
            cutter_worker_id: h.cutter_worker_id.to_hex(),
            picker_worker_id: h.picker_worker_id.map(|id| id.to_hex()),
            notes: h.notes,
            tree: row.tree.map(|t| HarvestTreeView {
                id: hex(&t.id),
                tree_id: t.tree_id,
                location: t.location,
            }),
            cutter: row.cutter.map(UserView::from),
            picker: row.picker.map(UserView::from),
        }
    }
}

pub async fn harvests_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<HarvestView>>> {
    let harvests = list_harvests(&st, &session.caller()).await?;
    Ok(Json(harvests.into_iter().map(HarvestView::from).collect()))
}

pub async fn harvests_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(form): Json<HarvestForm>,
) -> AppResult<(StatusCode, Json<CreatedView>)> {
    let input = NewHarvest {
        tree_id: parse_object_id(&form.tree_id)?,
        date_cut: form.date_cut,
        total_coconuts: form.total_coconuts,
        cutter_worker_id: parse_object_id(&form.cutter_worker_id)?,
        picker_worker_id: parse_opt_object_id(form.picker_worker_id.as_deref())?,
        notes: clean_opt(form.notes),
    };
    let id = create_harvest(&st, &session.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

pub async fn harvests_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<HarvestView>> {
    let id = parse_object_id(&id)?;
    let harvest = get_harvest_by_id(&st, &session.caller(), &id)
        .await?
        .ok_or(AppError::NotFound("harvest"))?;
    Ok(Json(harvest.into()))
}

pub async fn harvests_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_harvest(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `{id}` is the cutter's user id.
pub async fn worker_harvests(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<HarvestView>>> {
    let worker_id = parse_object_id(&id)?;
    let harvests = list_harvests_by_worker(&st, &session.caller(), &worker_id).await?;
    Ok(Json(harvests.into_iter().map(HarvestView::from).collect()))
}

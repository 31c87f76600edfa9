// routes/owners.rs
// /api/owners: tree owners (admin only).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    error::{AppError, AppResult},
    models::TreeOwnerPatch,
    routes::helpers::{CreatedView, OwnerView, parse_object_id},
    session::SessionUser,
    state::{
        AppState, NewTreeOwner, create_tree_owner, delete_tree_owner, get_tree_owner_by_id,
        list_tree_owners, update_tree_owner,
    },
};

pub async fn owners_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<OwnerView>>> {
    let owners = list_tree_owners(&st, &session.caller()).await?;
    Ok(Json(owners.into_iter().map(OwnerView::from).collect()))
}

pub async fn owners_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(body): Json<NewTreeOwner>,
) -> AppResult<(StatusCode, Json<CreatedView>)> {
    let id = create_tree_owner(&st, &session.caller(), body).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

pub async fn owners_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<OwnerView>> {
    let id = parse_object_id(&id)?;
    let owner = get_tree_owner_by_id(&st, &session.caller(), &id)
        .await?
        .ok_or(AppError::NotFound("tree owner"))?;
    Ok(Json(owner.into()))
}

pub async fn owners_update(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
    Json(patch): Json<TreeOwnerPatch>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    update_tree_owner(&st, &session.caller(), &id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn owners_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_tree_owner(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

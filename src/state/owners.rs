use mongodb::bson::{doc, oid::ObjectId};
use serde::Deserialize;

use crate::{
    access::{Caller, require_admin},
    error::AppResult,
    models::{TreeOwner, TreeOwnerPatch},
};

use super::{AppState, apply_patch, collect_all, delete_by_id, ensure_amount, ensure_count, inserted_id};

#[derive(Debug, Clone, Deserialize)]
pub struct NewTreeOwner {
    pub name: String,
    pub phone: String,
    pub location: String,
    pub number_of_trees: i64,
    pub annual_rent: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn create_tree_owner(
    state: &AppState,
    caller: &Caller,
    input: NewTreeOwner,
) -> AppResult<ObjectId> {
    require_admin(caller)?;
    ensure_count(input.number_of_trees, "number_of_trees")?;
    ensure_amount(input.annual_rent, "annual_rent")?;

    let res = state
        .tree_owners
        .insert_one(TreeOwner {
            id: None,
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            location: input.location.trim().to_string(),
            number_of_trees: input.number_of_trees,
            annual_rent: input.annual_rent,
            notes: input.notes,
        })
        .await?;
    let id = inserted_id(&res.inserted_id, "tree owner")?;
    tracing::info!(owner = %id, "tree owner created");
    Ok(id)
}

pub async fn list_tree_owners(state: &AppState, caller: &Caller) -> AppResult<Vec<TreeOwner>> {
    require_admin(caller)?;
    let cursor = state.tree_owners.find(doc! {}).await?;
    collect_all(cursor).await
}

pub async fn get_tree_owner_by_id(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
) -> AppResult<Option<TreeOwner>> {
    require_admin(caller)?;
    Ok(state.tree_owners.find_one(doc! { "_id": id }).await?)
}

pub async fn update_tree_owner(
    state: &AppState,
    caller: &Caller,
    id: &ObjectId,
    patch: TreeOwnerPatch,
) -> AppResult<()> {
    require_admin(caller)?;
    if let Some(n) = patch.number_of_trees {
        ensure_count(n, "number_of_trees")?;
    }
    if let Some(rent) = patch.annual_rent {
        ensure_amount(rent, "annual_rent")?;
    }
    apply_patch(&state.tree_owners, id, &patch, "tree owner").await?;
    tracing::info!(owner = %id, "tree owner updated");
    Ok(())
}

/// Hard delete. Trees and rent payments keep their now-dangling `owner_id`.
pub async fn delete_tree_owner(state: &AppState, caller: &Caller, id: &ObjectId) -> AppResult<()> {
    require_admin(caller)?;
    delete_by_id(&state.tree_owners, id, "tree owner").await?;
    tracing::info!(owner = %id, "tree owner deleted");
    Ok(())
}

// routes/helpers.rs
// Shared pieces of the JSON handlers: id parsing, range queries and the
// display rows for joined users and owners.

use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{TreeOwner, User},
};

pub(crate) fn parse_object_id(raw: &str) -> AppResult<ObjectId> {
    ObjectId::from_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("invalid id: {raw}")))
}

pub(crate) fn parse_opt_object_id(raw: Option<&str>) -> AppResult<Option<ObjectId>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_object_id(s).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn hex(id: &Option<ObjectId>) -> String {
    id.map(|oid| oid.to_hex()).unwrap_or_default()
}

pub(crate) fn clean_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `?start=&end=` in epoch milliseconds, both required.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: i64,
    pub end: i64,
}

/// Optional form of `RangeQuery` for listings that fall back to the latest page.
#[derive(Debug, Default, Deserialize)]
pub struct OptionalRangeQuery {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl OptionalRangeQuery {
    pub fn range(&self) -> AppResult<Option<(i64, i64)>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            (None, None) => Ok(None),
            _ => Err(AppError::Validation(
                "start and end must be given together".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedView {
    pub id: String,
}

impl From<ObjectId> for CreatedView {
    fn from(id: ObjectId) -> Self {
        CreatedView { id: id.to_hex() }
    }
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: &'static str,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        UserView {
            id: hex(&u.id),
            name: u.name,
            email: u.email,
            phone: u.phone,
            role: u.role.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OwnerView {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub number_of_trees: i64,
    pub annual_rent: f64,
    pub notes: Option<String>,
}

impl From<TreeOwner> for OwnerView {
    fn from(o: TreeOwner) -> Self {
        OwnerView {
            id: hex(&o.id),
            name: o.name,
            phone: o.phone,
            location: o.location,
            number_of_trees: o.number_of_trees,
            annual_rent: o.annual_rent,
            notes: o.notes,
        }
    }
}

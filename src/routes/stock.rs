// routes/stock.rs
// /api/stock, /api/stock/wastage and /api/stock/history.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{Stock, StockHistory, StockMovement, StockPatch},
    routes::helpers::hex,
    session::SessionUser,
    state::{AppState, get_current_stock, list_stock_history, record_wastage, update_stock},
};

#[derive(Deserialize)]
pub struct WastageForm {
    pub quantity: i64,
    pub date: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct StockHistoryView {
    pub id: String,
    pub date: i64,
    #[serde(rename = "type")]
    pub kind: StockMovement,
    pub quantity: i64,
    pub reason: String,
    pub reference_id: Option<String>,
}

impl From<StockHistory> for StockHistoryView {
    fn from(h: StockHistory) -> Self {
        StockHistoryView {
            id: hex(&h.id),
            date: h.date,
            kind: h.kind,
            quantity: h.quantity,
            reason: h.reason,
            reference_id: h.reference_id,
        }
    }
}

/// `null` until the first harvest or manual stock update.
pub async fn stock_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Option<Stock>>> {
    Ok(Json(get_current_stock(&st, &session.caller()).await?))
}

pub async fn stock_update(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(patch): Json<StockPatch>,
) -> AppResult<StatusCode> {
    update_stock(&st, &session.caller(), patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stock_wastage(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(form): Json<WastageForm>,
) -> AppResult<StatusCode> {
    record_wastage(&st, &session.caller(), form.quantity, form.date, form.reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stock_history(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<StockHistoryView>>> {
    let history = list_stock_history(&st, &session.caller()).await?;
    Ok(Json(history.into_iter().map(StockHistoryView::from).collect()))
}

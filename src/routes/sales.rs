// routes/sales.rs
// /api/sales and /api/sales/stats.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::Sale,
    routes::helpers::{CreatedView, RangeQuery, hex, parse_object_id},
    session::SessionUser,
    state::{
        AppState, NewSale, SalesStats, create_sale, delete_sale, get_sale_by_id, get_sales_stats,
        list_sales,
    },
};

#[derive(Serialize)]
pub struct SaleView {
    pub id: String,
    pub date: i64,
    pub quantity_sold: i64,
    pub rate_per_coconut: f64,
    pub total_revenue: f64,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
}

impl From<Sale> for SaleView {
    fn from(s: Sale) -> Self {
        SaleView {
            id: hex(&s.id),
            date: s.date,
            quantity_sold: s.quantity_sold,
            rate_per_coconut: s.rate_per_coconut,
            total_revenue: s.total_revenue,
            customer_name: s.customer_name,
            customer_phone: s.customer_phone,
            notes: s.notes,
        }
    }
}

pub async fn sales_index(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
) -> AppResult<Json<Vec<SaleView>>> {
    let sales = list_sales(&st, &session.caller()).await?;
    Ok(Json(sales.into_iter().map(SaleView::from).collect()))
}

pub async fn sales_create(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Json(body): Json<NewSale>,
) -> AppResult<(StatusCode, Json<CreatedView>)> {
    let id = create_sale(&st, &session.caller(), body).await?;
    Ok((StatusCode::CREATED, Json(id.into())))
}

pub async fn sales_show(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<Json<SaleView>> {
    let id = parse_object_id(&id)?;
    let sale = get_sale_by_id(&st, &session.caller(), &id)
        .await?
        .ok_or(AppError::NotFound("sale"))?;
    Ok(Json(sale.into()))
}

pub async fn sales_delete(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_object_id(&id)?;
    delete_sale(&st, &session.caller(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn sales_stats(
    State(st): State<Arc<AppState>>,
    session: SessionUser,
    Query(q): Query<RangeQuery>,
) -> AppResult<Json<SalesStats>> {
    let stats = get_sales_stats(&st, &session.caller(), q.start, q.end).await?;
    Ok(Json(stats))
}

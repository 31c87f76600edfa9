// lib.rs
// Router wiring for the coconut farm API.
//
// Endpoints:
// - GET  /           -> minimal HTML form to POST /login
// - POST /login      -> validates {"email","code"} against current TOTP, sets session cookie
// - POST /logout, GET /me, /me/totp, /me/qrcode
// - /api/...         -> JSON CRUD per entity plus dashboard statistics (session required)

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

pub mod access;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod totp;

use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/logout", post(routes::logout))
        .route("/me", get(routes::me))
        .route("/me/totp", get(routes::me_totp))
        .route("/me/qrcode", get(routes::me_qrcode))
        .route("/api/users", get(routes::users_index))
        .route(
            "/api/owners",
            get(routes::owners_index).post(routes::owners_create),
        )
        .route(
            "/api/owners/{id}",
            get(routes::owners_show)
                .patch(routes::owners_update)
                .delete(routes::owners_delete),
        )
        .route(
            "/api/trees",
            get(routes::trees_index).post(routes::trees_create),
        )
        .route(
            "/api/trees/{id}",
            get(routes::trees_show)
                .patch(routes::trees_update)
                .delete(routes::trees_delete),
        )
        .route(
            "/api/workers",
            get(routes::workers_index).post(routes::workers_create),
        )
        .route(
            "/api/workers/{id}",
            get(routes::workers_show)
                .patch(routes::workers_update)
                .delete(routes::workers_delete),
        )
        .route("/api/workers/{id}/qrcode", get(routes::workers_qrcode))
        .route("/api/workers/{id}/trees", get(routes::worker_trees))
        .route("/api/workers/{id}/harvests", get(routes::worker_harvests))
        .route("/api/workers/{id}/attendance", get(routes::worker_attendance))
        .route(
            "/api/workers/{id}/salary-payments",
            get(routes::worker_salary_payments),
        )
        .route(
            "/api/harvests",
            get(routes::harvests_index).post(routes::harvests_create),
        )
        .route(
            "/api/harvests/{id}",
            get(routes::harvests_show).delete(routes::harvests_delete),
        )
        .route(
            "/api/sales",
            get(routes::sales_index).post(routes::sales_create),
        )
        .route("/api/sales/stats", get(routes::sales_stats))
        .route(
            "/api/sales/{id}",
            get(routes::sales_show).delete(routes::sales_delete),
        )
        .route(
            "/api/payments/rent",
            get(routes::rent_index).post(routes::rent_create),
        )
        .route(
            "/api/payments/rent/{id}",
            patch(routes::rent_update).delete(routes::rent_delete),
        )
        .route(
            "/api/payments/salary",
            get(routes::salary_index).post(routes::salary_create),
        )
        .route(
            "/api/payments/salary/{id}",
            patch(routes::salary_update).delete(routes::salary_delete),
        )
        .route(
            "/api/attendance",
            get(routes::attendance_by_date).post(routes::attendance_mark),
        )
        .route("/api/attendance/{id}", delete(routes::attendance_delete))
        .route(
            "/api/stock",
            get(routes::stock_show).patch(routes::stock_update),
        )
        .route("/api/stock/wastage", post(routes::stock_wastage))
        .route("/api/stock/history", get(routes::stock_history))
        .route(
            "/api/expenses",
            get(routes::expenses_index).post(routes::expenses_create),
        )
        .route(
            "/api/expenses/{id}",
            get(routes::expenses_show)
                .patch(routes::expenses_update)
                .delete(routes::expenses_delete),
        )
        .route(
            "/api/settings",
            get(routes::settings_show).put(routes::settings_update),
        )
        .route("/api/dashboard/admin", get(routes::admin_dashboard))
        .route("/api/dashboard/worker/{id}", get(routes::worker_dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route("/", get(routes::home))
        .route("/login", post(routes::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

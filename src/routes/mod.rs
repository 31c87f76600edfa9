// routes/mod.rs
// Public re-exports of all route handlers.

pub mod helpers;
pub mod qrcode;

pub mod attendance;
pub mod dashboard;
pub mod expenses;
pub mod harvests;
pub mod home;
pub mod login;
pub mod logout;
pub mod me;
pub mod owners;
pub mod payments;
pub mod sales;
pub mod settings;
pub mod stock;
pub mod trees;
pub mod users;
pub mod workers;

pub use attendance::{attendance_by_date, attendance_delete, attendance_mark, worker_attendance};
pub use dashboard::{admin_dashboard, worker_dashboard};
pub use expenses::{
    expenses_create, expenses_delete, expenses_index, expenses_show, expenses_update,
};
pub use harvests::{
    harvests_create, harvests_delete, harvests_index, harvests_show, worker_harvests,
};
pub use home::home;
pub use login::login;
pub use logout::logout;
pub use me::{me, me_qrcode, me_totp};
pub use owners::{owners_create, owners_delete, owners_index, owners_show, owners_update};
pub use payments::{
    rent_create, rent_delete, rent_index, rent_update, salary_create, salary_delete, salary_index,
    salary_update, worker_salary_payments,
};
pub use sales::{sales_create, sales_delete, sales_index, sales_show, sales_stats};
pub use settings::{settings_show, settings_update};
pub use stock::{stock_history, stock_show, stock_update, stock_wastage};
pub use trees::{trees_create, trees_delete, trees_index, trees_show, trees_update, worker_trees};
pub use users::users_index;
pub use workers::{
    workers_create, workers_delete, workers_index, workers_qrcode, workers_show, workers_update,
};

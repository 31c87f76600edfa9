// models.rs
// Domain models stored in MongoDB collections, plus the patch documents used
// by partial updates. Dates are epoch milliseconds.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// User roles for authorization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Worker,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Worker => "worker",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Worker
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActiveStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    Daily,
    PerCoconut,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Cutting,
    Picking,
    Both,
    Maintenance,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockMovement {
    In,
    Out,
    Wastage,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RentStatus {
    Paid,
    Pending,
    Overdue,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalaryStatus {
    Paid,
    Pending,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Transport,
    Storage,
    Maintenance,
    Other,
}

/// Application user. Workers are users with role `worker` plus a `Worker` profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    /// Base32 TOTP secret; users without one cannot log in.
    #[serde(default)]
    pub secret: Option<String>,
}

/// Session document linking a token to a user and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token: String,
    pub user_id: ObjectId,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeOwner {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub number_of_trees: i64,
    pub annual_rent: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoconutTree {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub tree_id: String,
    pub owner_id: ObjectId,
    pub location: String,
    pub rent_per_year: f64,
    pub expected_coconuts_count: i64,
    #[serde(default)]
    pub last_cut_date: Option<i64>,
    #[serde(default)]
    pub next_cut_date: Option<i64>,
    #[serde(default)]
    pub assigned_worker_id: Option<ObjectId>,
    pub status: ActiveStatus,
}

/// Worker profile, 1:1 with a `User` of role worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub salary_type: SalaryType,
    pub salary_amount: f64,
    pub location: String,
    pub status: ActiveStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Harvest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub tree_id: ObjectId,
    pub date_cut: i64,
    pub total_coconuts: i64,
    pub cutter_worker_id: ObjectId,
    #[serde(default)]
    pub picker_worker_id: Option<ObjectId>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub worker_id: ObjectId,
    pub date: i64,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub trees_worked: Option<i64>,
    #[serde(default)]
    pub coconuts_harvested: Option<i64>,
    #[serde(default)]
    pub amount_earned: Option<f64>,
    #[serde(default)]
    pub work_type: Option<WorkType>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Stock singleton, stored under a fixed `_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub fresh_coconuts: i64,
    pub old_stock: i64,
    pub damaged_coconuts: i64,
    pub last_updated: i64,
}

/// Append-only ledger entry of stock movements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockHistory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub date: i64,
    #[serde(rename = "type")]
    pub kind: StockMovement,
    pub quantity: i64,
    pub reason: String,
    #[serde(default)]
    pub reference_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub date: i64,
    pub quantity_sold: i64,
    pub rate_per_coconut: f64,
    pub total_revenue: f64,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentPayment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: ObjectId,
    pub amount: f64,
    pub payment_date: i64,
    pub due_date: i64,
    pub status: RentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Salary payment; `worker_id` references the worker's `User`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryPayment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub worker_id: ObjectId,
    pub amount: f64,
    pub payment_date: i64,
    pub period_start: i64,
    pub period_end: i64,
    pub status: SalaryStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub date: i64,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Business settings singleton, stored under a fixed `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub business_name: String,
    pub location: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Rent cycle in days.
    pub default_rent_cycle: i64,
}

// Patch documents: every `None` field is skipped when serialized into `$set`.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeOwnerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_trees: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoconutTreePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_per_year: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_coconuts_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cut_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cut_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_worker_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActiveStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_type: Option<SalaryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActiveStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RentPaymentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalaryPaymentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SalaryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpensePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh_coconuts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damaged_coconuts: Option<i64>,
}

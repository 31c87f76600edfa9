#[path = "common/mod.rs"]
mod common;

use cocofarm::{
    models::{ActiveStatus, ExpenseCategory, RentStatus, SalaryStatus, StockMovement, StockPatch},
    state::{
        NewCoconutTree, NewExpense, NewHarvest, NewRentPayment, NewSalaryPayment, NewSale,
        NewTreeOwner, create_expense, create_harvest, create_rent_payment, create_salary_payment,
        create_sale, create_tree, create_tree_owner, delete_tree_owner, get_admin_stats,
        get_current_stock, get_tree_by_id, list_harvests, list_stock_history, list_trees,
        record_wastage, update_stock,
    },
    error::AppError,
};
use common::{DAY, TestContext};
use mongodb::bson::oid::ObjectId;

const D: i64 = 1_717_200_000_000;

async fn owner(ctx: &TestContext, name: &str) -> ObjectId {
    create_tree_owner(
        &ctx.state,
        &ctx.admin,
        NewTreeOwner {
            name: name.to_string(),
            phone: "555-0101".to_string(),
            location: "Coast road".to_string(),
            number_of_trees: 10,
            annual_rent: 50000.0,
            notes: None,
        },
    )
    .await
    .unwrap()
}

async fn tree(ctx: &TestContext, owner_id: ObjectId, worker: Option<ObjectId>) -> ObjectId {
    create_tree(
        &ctx.state,
        &ctx.admin,
        NewCoconutTree {
            tree_id: "T1".to_string(),
            owner_id,
            location: "Coast road".to_string(),
            rent_per_year: 5000.0,
            expected_coconuts_count: 150,
            assigned_worker_id: worker,
        },
    )
    .await
    .unwrap()
}

fn sale(date: i64, quantity_sold: i64, rate: f64) -> NewSale {
    NewSale {
        date,
        quantity_sold,
        rate_per_coconut: rate,
        customer_name: Some("Market stall".to_string()),
        customer_phone: None,
        notes: None,
    }
}

#[tokio::test]
async fn harvest_then_sale_scenario() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;

    let owner_id = owner(&ctx, "Owner A").await;
    let (_, w1) = common::add_worker(&ctx, "W1", "w1@cocofarm.test").await;
    let w1_id = w1.id.unwrap();
    let tree_id = tree(&ctx, owner_id, Some(w1_id)).await;

    let harvest_id = create_harvest(
        st,
        &ctx.admin,
        NewHarvest {
            tree_id,
            date_cut: D,
            total_coconuts: 120,
            cutter_worker_id: w1_id,
            picker_worker_id: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let stock = get_current_stock(st, &ctx.admin).await.unwrap().unwrap();
    assert_eq!(stock.fresh_coconuts, 120);
    assert_eq!(stock.old_stock, 0);
    assert_eq!(stock.damaged_coconuts, 0);

    let t1 = get_tree_by_id(st, &ctx.admin, &tree_id).await.unwrap().unwrap();
    assert_eq!(t1.tree.last_cut_date, Some(D));
    assert_eq!(t1.tree.next_cut_date, Some(D + 45 * DAY));
    assert_eq!(t1.owner.unwrap().name, "Owner A");
    assert_eq!(t1.worker.unwrap().name, "W1");

    let history = list_stock_history(st, &ctx.admin).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, StockMovement::In);
    assert_eq!(history[0].quantity, 120);
    assert_eq!(history[0].reason, "Harvest");
    assert_eq!(history[0].reference_id, Some(harvest_id.to_hex()));

    let sale_id = create_sale(st, &ctx.admin, sale(D, 50, 20.0)).await.unwrap();
    let stock = get_current_stock(st, &ctx.admin).await.unwrap().unwrap();
    assert_eq!(stock.fresh_coconuts, 70);

    let history = list_stock_history(st, &ctx.admin).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, StockMovement::Out);
    assert_eq!(history[0].reason, "Sale");
    assert_eq!(history[0].reference_id, Some(sale_id.to_hex()));

    let stats = get_admin_stats(st, &ctx.admin, D, D).await.unwrap().unwrap();
    assert_eq!(stats.totals.total_revenue, 1000.0);
    assert_eq!(stats.totals.sales_count, 1);
    assert_eq!(stats.active_trees, 1);
    assert_eq!(stats.active_workers, 1);
    assert_eq!(stats.total_owners, 1);
    assert_eq!(stats.current_stock.unwrap().fresh_coconuts, 70);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn harvest_on_missing_tree_writes_nothing() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };

    let err = create_harvest(
        &ctx.state,
        &ctx.admin,
        NewHarvest {
            tree_id: ObjectId::new(),
            date_cut: D,
            total_coconuts: 10,
            cutter_worker_id: ObjectId::new(),
            picker_worker_id: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("tree")));
    assert!(get_current_stock(&ctx.state, &ctx.admin).await.unwrap().is_none());
    assert!(list_stock_history(&ctx.state, &ctx.admin).await.unwrap().is_empty());

    common::teardown(ctx).await;
}

#[tokio::test]
async fn harvest_with_out_of_range_date_writes_nothing() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;
    let owner_id = owner(&ctx, "Owner A").await;
    let tree_id = tree(&ctx, owner_id, None).await;

    let err = create_harvest(
        st,
        &ctx.admin,
        NewHarvest {
            tree_id,
            date_cut: i64::MAX - 1000,
            total_coconuts: 10,
            cutter_worker_id: ObjectId::new(),
            picker_worker_id: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(list_harvests(st, &ctx.admin).await.unwrap().is_empty());
    assert!(get_current_stock(st, &ctx.admin).await.unwrap().is_none());
    let stored = get_tree_by_id(st, &ctx.admin, &tree_id).await.unwrap().unwrap();
    assert_eq!(stored.tree.last_cut_date, None);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn sale_larger_than_stock_floors_at_zero() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;

    update_stock(
        st,
        &ctx.admin,
        StockPatch {
            fresh_coconuts: Some(30),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let stock = get_current_stock(st, &ctx.admin).await.unwrap().unwrap();
    assert_eq!((stock.fresh_coconuts, stock.old_stock, stock.damaged_coconuts), (30, 0, 0));

    create_sale(st, &ctx.admin, sale(D, 50, 10.0)).await.unwrap();
    let stock = get_current_stock(st, &ctx.admin).await.unwrap().unwrap();
    assert_eq!(stock.fresh_coconuts, 0);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn sale_without_stock_creates_no_singleton() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };

    create_sale(&ctx.state, &ctx.admin, sale(D, 5, 10.0)).await.unwrap();
    assert!(get_current_stock(&ctx.state, &ctx.admin).await.unwrap().is_none());
    assert_eq!(list_stock_history(&ctx.state, &ctx.admin).await.unwrap().len(), 1);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn wastage_moves_fresh_to_damaged() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;

    let err = record_wastage(st, &ctx.admin, 5, D, None).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("stock")));

    update_stock(
        st,
        &ctx.admin,
        StockPatch {
            fresh_coconuts: Some(20),
            damaged_coconuts: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    record_wastage(st, &ctx.admin, 8, D, Some("Rot".into())).await.unwrap();
    let stock = get_current_stock(st, &ctx.admin).await.unwrap().unwrap();
    assert_eq!((stock.fresh_coconuts, stock.damaged_coconuts), (12, 10));

    record_wastage(st, &ctx.admin, 50, D, None).await.unwrap();
    let stock = get_current_stock(st, &ctx.admin).await.unwrap().unwrap();
    assert_eq!((stock.fresh_coconuts, stock.damaged_coconuts), (0, 22));

    let history = list_stock_history(st, &ctx.admin).await.unwrap();
    assert_eq!(history[1].kind, StockMovement::Wastage);
    assert_eq!(history[1].reason, "Rot");
    assert_eq!(history[1].quantity, 8);
    assert_eq!(history[0].reason, "Wastage");
    // Only the 12 fresh coconuts left could be moved.
    assert_eq!(history[0].quantity, 12);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn admin_stats_sum_paid_costs_and_allow_losses() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;
    let owner_id = owner(&ctx, "Owner B").await;
    let (_, w) = common::add_worker(&ctx, "W2", "w2@cocofarm.test").await;

    create_sale(st, &ctx.admin, sale(D, 10, 10.0)).await.unwrap();
    create_sale(st, &ctx.admin, sale(D + 10 * DAY, 1000, 10.0)).await.unwrap();
    for (status, amount) in [(RentStatus::Paid, 300.0), (RentStatus::Pending, 9000.0)] {
        create_rent_payment(
            st,
            &ctx.admin,
            NewRentPayment {
                owner_id,
                amount,
                payment_date: D,
                due_date: D,
                status,
                notes: None,
            },
        )
        .await
        .unwrap();
    }
    create_salary_payment(
        st,
        &ctx.admin,
        NewSalaryPayment {
            worker_id: w.id.unwrap(),
            amount: 200.0,
            payment_date: D,
            period_start: D - 7 * DAY,
            period_end: D,
            status: SalaryStatus::Paid,
            notes: None,
        },
    )
    .await
    .unwrap();
    create_expense(
        st,
        &ctx.admin,
        NewExpense {
            date: D,
            category: ExpenseCategory::Transport,
            amount: 50.0,
            description: "Truck hire".to_string(),
            notes: None,
        },
    )
    .await
    .unwrap();

    let stats = get_admin_stats(st, &ctx.admin, D, D + DAY).await.unwrap().unwrap();
    assert_eq!(stats.totals.total_revenue, 100.0);
    assert_eq!(stats.totals.total_rent_paid, 300.0);
    assert_eq!(stats.totals.total_salary_paid, 200.0);
    assert_eq!(stats.totals.total_expenses, 50.0);
    assert_eq!(stats.totals.total_costs, 550.0);
    assert_eq!(stats.totals.profit, -450.0);
    assert_eq!(stats.totals.sales_count, 1);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn deleting_owner_leaves_trees_with_dangling_owner() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;
    let owner_id = owner(&ctx, "Owner C").await;
    let tree_id = tree(&ctx, owner_id, None).await;

    delete_tree_owner(st, &ctx.admin, &owner_id).await.unwrap();

    let row = get_tree_by_id(st, &ctx.admin, &tree_id).await.unwrap().unwrap();
    assert_eq!(row.tree.owner_id, owner_id);
    assert_eq!(row.tree.status, ActiveStatus::Active);
    assert!(row.owner.is_none());
    assert!(row.worker.is_none());
    assert_eq!(list_trees(st, &ctx.admin).await.unwrap().len(), 1);

    let err = delete_tree_owner(st, &ctx.admin, &owner_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    common::teardown(ctx).await;
}

#[path = "common/mod.rs"]
mod common;

use cocofarm::{
    access::Caller,
    error::AppError,
    models::{
        ActiveStatus, AttendanceStatus, SalaryStatus, SalaryType, Settings, WorkType, WorkerPatch,
    },
    state::{
        AttendanceMark, NewCoconutTree, NewHarvest, NewSalaryPayment, NewTreeOwner, NewWorker,
        UNKNOWN_WORKER, create_harvest, create_salary_payment, create_tree, create_tree_owner,
        create_worker, delete_attendance, get_settings, get_worker_stats, list_attendance_by_date,
        list_users, list_worker_attendance, list_workers, mark_attendance, totp_issuer,
        update_settings, update_worker,
    },
    totp::DEFAULT_ISSUER,
};
use common::{ADMIN_EMAIL, DAY};
use mongodb::bson::oid::ObjectId;

const D: i64 = 1_717_200_000_000;

fn mark(worker_id: ObjectId, date: i64, status: AttendanceStatus) -> AttendanceMark {
    AttendanceMark {
        worker_id,
        date,
        status,
        trees_worked: None,
        coconuts_harvested: None,
        amount_earned: None,
        work_type: None,
        notes: None,
    }
}

#[tokio::test]
async fn marking_twice_keeps_one_record() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;
    let (_, w1) = common::add_worker(&ctx, "W1", "w1@cocofarm.test").await;
    let w1_id = w1.id.unwrap();

    let first = mark_attendance(st, &ctx.admin, mark(w1_id, D, AttendanceStatus::Present))
        .await
        .unwrap();
    let second = mark_attendance(
        st,
        &ctx.admin,
        AttendanceMark {
            trees_worked: Some(4),
            work_type: Some(WorkType::Cutting),
            ..mark(w1_id, D, AttendanceStatus::HalfDay)
        },
    )
    .await
    .unwrap();
    assert_eq!(first, second);

    let rows = list_attendance_by_date(st, &ctx.admin, D).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.status, AttendanceStatus::HalfDay);
    assert_eq!(rows[0].record.trees_worked, Some(4));
    assert_eq!(rows[0].record.work_type, Some(WorkType::Cutting));
    assert_eq!(rows[0].worker_name, "W1");
    assert_eq!(rows[0].worker_email.as_deref(), Some("w1@cocofarm.test"));

    // A mark for a user that does not exist shows as "Unknown".
    mark_attendance(st, &ctx.admin, mark(ObjectId::new(), D, AttendanceStatus::Absent))
        .await
        .unwrap();
    let rows = list_attendance_by_date(st, &ctx.admin, D).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.worker_name == UNKNOWN_WORKER));

    common::teardown(ctx).await;
}

#[tokio::test]
async fn worker_attendance_history_is_newest_first() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;
    let (_, w1) = common::add_worker(&ctx, "W1", "w1@cocofarm.test").await;
    let w1_id = w1.id.unwrap();
    let w1 = Caller::from(w1);

    for day in 0..3 {
        mark_attendance(st, &ctx.admin, mark(w1_id, D + day * DAY, AttendanceStatus::Present))
            .await
            .unwrap();
    }

    let all = list_worker_attendance(st, &w1, &w1_id, None).await.unwrap();
    let dates: Vec<i64> = all.iter().map(|a| a.date).collect();
    assert_eq!(dates, vec![D + 2 * DAY, D + DAY, D]);

    let ranged = list_worker_attendance(st, &w1, &w1_id, Some((D, D + DAY))).await.unwrap();
    assert_eq!(ranged.len(), 2);

    delete_attendance(st, &ctx.admin, &all[0].id.unwrap()).await.unwrap();
    assert_eq!(list_worker_attendance(st, &w1, &w1_id, None).await.unwrap().len(), 2);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn worker_stats_count_harvests_and_pending_pay() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;
    let (_, w1) = common::add_worker(&ctx, "W1", "w1@cocofarm.test").await;
    let w1_id = w1.id.unwrap();

    let owner_id = create_tree_owner(
        st,
        &ctx.admin,
        NewTreeOwner {
            name: "Owner A".to_string(),
            phone: "555-0101".to_string(),
            location: "Coast road".to_string(),
            number_of_trees: 2,
            annual_rent: 1000.0,
            notes: None,
        },
    )
    .await
    .unwrap();
    let tree_id = create_tree(
        st,
        &ctx.admin,
        NewCoconutTree {
            tree_id: "T1".to_string(),
            owner_id,
            location: "Coast road".to_string(),
            rent_per_year: 500.0,
            expected_coconuts_count: 100,
            assigned_worker_id: Some(w1_id),
        },
    )
    .await
    .unwrap();

    for (date, count) in [(D, 120), (D + DAY, 80), (D + 30 * DAY, 999)] {
        create_harvest(
            st,
            &ctx.admin,
            NewHarvest {
                tree_id,
                date_cut: date,
                total_coconuts: count,
                cutter_worker_id: w1_id,
                picker_worker_id: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    }
    for (date, amount, status) in [
        (D, 500.0, SalaryStatus::Paid),
        (D + 30 * DAY, 700.0, SalaryStatus::Paid),
        (D + 60 * DAY, 250.0, SalaryStatus::Pending),
    ] {
        create_salary_payment(
            st,
            &ctx.admin,
            NewSalaryPayment {
                worker_id: w1_id,
                amount,
                payment_date: date,
                period_start: date - 7 * DAY,
                period_end: date,
                status,
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    let stats = get_worker_stats(st, &ctx.admin, &w1_id, D, D + DAY)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stats.total_coconuts, 200);
    assert_eq!(stats.harvest_count, 2);
    assert_eq!(stats.trees_worked, 2);
    assert_eq!(stats.total_earned, 500.0);
    assert_eq!(stats.pending_payments, 250.0);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn settings_and_worker_updates() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;
    let (profile_id, _) = common::add_worker(&ctx, "W1", "w1@cocofarm.test").await;

    assert!(get_settings(st, &ctx.admin).await.unwrap().is_none());
    assert_eq!(totp_issuer(st).await.unwrap(), DEFAULT_ISSUER);

    let settings = Settings {
        business_name: "Palm Grove Traders".to_string(),
        location: "Kerala".to_string(),
        phone: "555-0199".to_string(),
        email: None,
        default_rent_cycle: 365,
    };
    update_settings(st, &ctx.admin, settings.clone()).await.unwrap();
    assert_eq!(get_settings(st, &ctx.admin).await.unwrap(), Some(settings));
    assert_eq!(totp_issuer(st).await.unwrap(), "Palm Grove Traders");

    update_worker(
        st,
        &ctx.admin,
        &profile_id,
        WorkerPatch {
            salary_amount: Some(650.0),
            status: Some(ActiveStatus::Inactive),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let workers = list_workers(st, &ctx.admin).await.unwrap();
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0].worker.salary_amount, 650.0);
    assert_eq!(workers[0].worker.status, ActiveStatus::Inactive);
    assert_eq!(workers[0].worker.location, "North grove");

    common::teardown(ctx).await;
}

fn worker_input(email: Option<&str>) -> NewWorker {
    NewWorker {
        name: "W2".to_string(),
        email: email.map(str::to_string),
        phone: "555-0102".to_string(),
        location: "South grove".to_string(),
        salary_type: SalaryType::PerCoconut,
        salary_amount: 40.0,
    }
}

#[tokio::test]
async fn worker_emails_are_unique() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let st = &ctx.state;
    common::add_worker(&ctx, "W1", "w1@cocofarm.test").await;

    for taken in [" W1@Cocofarm.test ", ADMIN_EMAIL] {
        let err = create_worker(st, &ctx.admin, worker_input(Some(taken)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    // Workers without an email do not collide with each other.
    create_worker(st, &ctx.admin, worker_input(None)).await.unwrap();
    create_worker(st, &ctx.admin, worker_input(Some(""))).await.unwrap();

    assert_eq!(list_workers(st, &ctx.admin).await.unwrap().len(), 3);
    assert_eq!(list_users(st, &ctx.admin).await.unwrap().len(), 4);

    common::teardown(ctx).await;
}

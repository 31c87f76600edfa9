#![allow(dead_code)]

use std::{
    env,
    sync::{
        Mutex, MutexGuard, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use mongodb::{Client, bson::oid::ObjectId};

use cocofarm::{
    access::Caller,
    config::Config,
    models::{SalaryType, User},
    state::{AppState, NewWorker, create_worker, find_user_by_email, get_worker_by_id, init_state},
    totp::{DEFAULT_SECRET_BYTES, generate_secret},
};

pub const ADMIN_EMAIL: &str = "admin@cocofarm.test";
pub const DAY: i64 = 24 * 60 * 60 * 1000;

/// Global lock so integration tests that mutate the DB run one-at-a-time.
static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
static TEST_DB_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct TestContext {
    pub state: AppState,
    pub admin: Caller,
    pub admin_secret: String,
    pub db_name: String,
    uri: String,
    _guard: MutexGuard<'static, ()>,
}

fn test_uri() -> String {
    let uri = env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    if uri.contains("serverSelectionTimeoutMS") {
        uri
    } else if uri.contains('?') {
        format!("{uri}&serverSelectionTimeoutMS=2000")
    } else {
        format!("{uri}/?serverSelectionTimeoutMS=2000")
    }
}

pub async fn setup_state() -> Option<TestContext> {
    let guard = TEST_DB_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let uri = test_uri();
    let db_name = format!(
        "cocofarmtest_{}_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis(),
        TEST_DB_SEQ.fetch_add(1, Ordering::SeqCst)
    );
    let admin_secret = generate_secret(DEFAULT_SECRET_BYTES);
    let config = Config {
        mongodb_uri: uri.clone(),
        mongodb_db: db_name.clone(),
        bind_addr: "127.0.0.1:0".to_string(),
        session_ttl_seconds: 3600,
        admin_email: ADMIN_EMAIL.to_string(),
        admin_name: "Test Admin".to_string(),
        admin_secret: Some(admin_secret.clone()),
    };

    let state = match init_state(&config).await {
        Ok(state) => state,
        Err(err) => {
            eprintln!("Skipping test; init_state failed: {err:?}");
            return None;
        }
    };
    let admin = match find_user_by_email(&state, ADMIN_EMAIL).await {
        Ok(Some(user)) => Caller::from(user),
        other => {
            eprintln!("Skipping test; seeded admin missing: {other:?}");
            return None;
        }
    };

    Some(TestContext {
        state,
        admin,
        admin_secret,
        db_name,
        uri,
        _guard: guard,
    })
}

pub async fn teardown(ctx: TestContext) {
    if let Ok(client) = Client::with_uri_str(&ctx.uri).await {
        let _ = client.database(&ctx.db_name).drop().await;
    }
}

/// Creates a daily-paid worker and returns (profile id, its user).
pub async fn add_worker(ctx: &TestContext, name: &str, email: &str) -> (ObjectId, User) {
    let profile_id = create_worker(
        &ctx.state,
        &ctx.admin,
        NewWorker {
            name: name.to_string(),
            email: Some(email.to_string()),
            phone: "555-0100".to_string(),
            location: "North grove".to_string(),
            salary_type: SalaryType::Daily,
            salary_amount: 500.0,
        },
    )
    .await
    .unwrap();
    let worker = get_worker_by_id(&ctx.state, &ctx.admin, &profile_id)
        .await
        .unwrap()
        .unwrap();
    (profile_id, worker.user.unwrap())
}

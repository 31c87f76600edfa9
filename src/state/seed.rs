use anyhow::{Context, Result};
use mongodb::{
    Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};

use crate::{
    config::Config,
    models::{User, UserRole},
    totp::{DEFAULT_SECRET_BYTES, generate_secret},
};

const COLLECTIONS: &[&str] = &[
    "users",
    "sessions",
    "tree_owners",
    "coconut_trees",
    "workers",
    "harvests",
    "attendance",
    "stock",
    "stock_history",
    "sales",
    "rent_payments",
    "salary_payments",
    "expenses",
    "settings",
];

pub(super) async fn is_database_empty(db: &Database) -> Result<bool> {
    let count = db
        .collection::<User>("users")
        .count_documents(doc! { "role": UserRole::Admin.as_str() })
        .await?;
    Ok(count == 0)
}

pub(super) async fn ensure_collections(db: &Database) -> Result<()> {
    let existing = db.list_collection_names().await?;
    for name in COLLECTIONS {
        if !existing.iter().any(|e| e == name) {
            db.create_collection(*name)
                .await
                .with_context(|| format!("failed to create collection {name}"))?;
        }
    }
    Ok(())
}

/// Lookup indexes for the access paths the operations use. Attendance
/// uniqueness per (worker, date) is kept by upsert logic, not by this index.
pub(super) async fn ensure_indexes(db: &Database) -> Result<()> {
    let plain = |keys: Document| IndexModel::builder().keys(keys).build();

    db.collection::<Document>("sessions")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "token": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;
    db.collection::<Document>("users")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { "email": { "$type": "string" } })
                        .name("email_unique".to_string())
                        .build(),
                )
                .build(),
        )
        .await?;
    db.collection::<Document>("coconut_trees")
        .create_index(plain(doc! { "assigned_worker_id": 1 }))
        .await?;
    db.collection::<Document>("workers")
        .create_index(plain(doc! { "user_id": 1 }))
        .await?;
    db.collection::<Document>("harvests")
        .create_index(plain(doc! { "cutter_worker_id": 1 }))
        .await?;
    db.collection::<Document>("attendance")
        .create_index(plain(doc! { "worker_id": 1, "date": 1 }))
        .await?;
    db.collection::<Document>("attendance")
        .create_index(plain(doc! { "date": 1 }))
        .await?;
    db.collection::<Document>("salary_payments")
        .create_index(plain(doc! { "worker_id": 1, "payment_date": 1 }))
        .await?;
    Ok(())
}

pub(super) async fn seed_admin(db: &Database, config: &Config) -> Result<()> {
    let secret = match &config.admin_secret {
        Some(secret) => secret.clone(),
        None => {
            let generated = generate_secret(DEFAULT_SECRET_BYTES);
            tracing::warn!(
                email = %config.admin_email,
                secret = %generated,
                "generated TOTP secret for bootstrap admin; enroll it now, it is not shown again"
            );
            generated
        }
    };

    db.collection::<User>("users")
        .insert_one(User {
            id: None,
            name: config.admin_name.clone(),
            email: Some(config.admin_email.trim().to_lowercase()),
            phone: None,
            role: UserRole::Admin,
            secret: Some(secret),
        })
        .await
        .context("failed to seed admin user")?;

    tracing::info!(email = %config.admin_email, "seeded bootstrap admin");
    Ok(())
}

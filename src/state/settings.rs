use mongodb::bson::{doc, to_document};

use crate::{
    access::{Caller, require_admin, require_user},
    error::{AppError, AppResult},
    models::Settings,
    totp::DEFAULT_ISSUER,
};

use super::{AppState, SINGLETON_KEY, ensure_count};

pub async fn get_settings(state: &AppState, caller: &Caller) -> AppResult<Option<Settings>> {
    require_user(caller)?;
    Ok(state.settings.find_one(doc! { "_id": SINGLETON_KEY }).await?)
}

/// Replaces the settings singleton, creating it on first save.
pub async fn update_settings(state: &AppState, caller: &Caller, settings: Settings) -> AppResult<()> {
    require_admin(caller)?;
    if settings.business_name.trim().is_empty() {
        return Err(AppError::Validation("business_name is required".into()));
    }
    ensure_count(settings.default_rent_cycle, "default_rent_cycle")?;

    state
        .settings
        .update_one(
            doc! { "_id": SINGLETON_KEY },
            doc! { "$set": to_document(&settings)? },
        )
        .upsert(true)
        .await?;
    tracing::info!(business = %settings.business_name, "settings saved");
    Ok(())
}

/// Issuer shown in authenticator apps: the business name, or a default
/// before settings are saved. Needs no caller; login enrollment uses it.
pub async fn totp_issuer(state: &AppState) -> AppResult<String> {
    let settings = state.settings.find_one(doc! { "_id": SINGLETON_KEY }).await?;
    Ok(settings
        .map(|s| s.business_name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ISSUER.to_string()))
}

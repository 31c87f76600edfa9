use data_encoding::BASE32_NOPAD;
use mongodb::bson::{doc, oid::ObjectId};
use rand::RngCore;

use crate::{
    access::{Caller, require_admin, require_admin_or_self},
    error::{AppError, AppResult},
    models::{Session, User},
    totp::build_totp,
};

use super::{AppState, collect_all, now_millis, totp_issuer};

pub async fn find_user_by_email(state: &AppState, email: &str) -> AppResult<Option<User>> {
    Ok(state.users.find_one(doc! { "email": email }).await?)
}

/// Unchecked lookup used by joins; a deleted user resolves to `None`.
pub async fn get_user_by_id(state: &AppState, id: &ObjectId) -> AppResult<Option<User>> {
    Ok(state.users.find_one(doc! { "_id": id }).await?)
}

pub async fn list_users(state: &AppState, caller: &Caller) -> AppResult<Vec<User>> {
    require_admin(caller)?;
    let cursor = state.users.find(doc! {}).await?;
    collect_all(cursor).await
}

pub async fn create_session(state: &AppState, user_id: &ObjectId) -> AppResult<String> {
    let _ = state
        .sessions
        .delete_many(doc! { "user_id": user_id })
        .await;

    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    let token = BASE32_NOPAD.encode(&token_bytes);

    let ttl_millis = i64::try_from(state.session_ttl_seconds)
        .unwrap_or(i64::MAX / 1000)
        .saturating_mul(1000);

    state
        .sessions
        .insert_one(Session {
            id: None,
            token: token.clone(),
            user_id: *user_id,
            expires_at: now_millis().saturating_add(ttl_millis),
        })
        .await?;

    tracing::info!(user = %user_id, "session created");
    Ok(token)
}

pub async fn find_user_by_session(state: &AppState, token: &str) -> AppResult<Option<User>> {
    let Some(session) = state.sessions.find_one(doc! { "token": token }).await? else {
        return Ok(None);
    };
    if session.expires_at <= now_millis() {
        let _ = state.sessions.delete_one(doc! { "token": token }).await;
        return Ok(None);
    }
    get_user_by_id(state, &session.user_id).await
}

pub async fn delete_session(state: &AppState, token: &str) -> AppResult<()> {
    state.sessions.delete_one(doc! { "token": token }).await?;
    Ok(())
}

/// otpauth URL for enrolling the user's authenticator app. The account label
/// is the email, or the name for users without one.
pub async fn enrollment_url(state: &AppState, caller: &Caller, user_id: &ObjectId) -> AppResult<String> {
    require_admin_or_self(caller, user_id)?;
    let user = get_user_by_id(state, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    let secret = user
        .secret
        .as_deref()
        .ok_or_else(|| AppError::Validation("user has no TOTP secret".into()))?;
    let account = user.email.as_deref().unwrap_or(&user.name);
    let issuer = totp_issuer(state).await?;
    let totp = build_totp(&issuer, account, secret)?;
    Ok(totp.get_url())
}

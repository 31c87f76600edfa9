// access.rs
// Caller identity and the role guards every business operation runs first.

use mongodb::bson::oid::ObjectId;

use crate::{
    error::{AppError, AppResult},
    models::User,
};

/// Identity of whoever invoked an operation. Anonymous callers carry no user.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    user: Option<User>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Caller { user: None }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&ObjectId> {
        self.user.as_ref().and_then(|u| u.id.as_ref())
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }
}

impl From<User> for Caller {
    fn from(user: User) -> Self {
        Caller { user: Some(user) }
    }
}

pub fn require_user(caller: &Caller) -> AppResult<&User> {
    caller.user().ok_or_else(|| {
        tracing::warn!("rejected anonymous caller");
        AppError::Unauthorized
    })
}

pub fn require_admin(caller: &Caller) -> AppResult<&User> {
    let user = require_user(caller)?;
    if user.role.is_admin() {
        Ok(user)
    } else {
        tracing::warn!(user = ?user.id, "rejected non-admin caller");
        Err(AppError::Unauthorized)
    }
}

/// Admins may read any worker's records; workers only their own.
pub fn require_admin_or_self<'a>(caller: &'a Caller, subject: &ObjectId) -> AppResult<&'a User> {
    let user = require_user(caller)?;
    if user.role.is_admin() || user.id.as_ref() == Some(subject) {
        Ok(user)
    } else {
        tracing::warn!(user = ?user.id, subject = %subject, "rejected access to another worker's records");
        Err(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn user(role: UserRole) -> User {
        User {
            id: Some(ObjectId::new()),
            name: "Test".into(),
            email: None,
            phone: None,
            role,
            secret: None,
        }
    }

    #[test]
    fn anonymous_is_rejected_everywhere() {
        let caller = Caller::anonymous();
        assert!(matches!(require_user(&caller), Err(AppError::Unauthorized)));
        assert!(matches!(require_admin(&caller), Err(AppError::Unauthorized)));
        assert!(matches!(
            require_admin_or_self(&caller, &ObjectId::new()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn worker_cannot_pass_admin_guard() {
        let caller = Caller::from(user(UserRole::Worker));
        assert!(require_user(&caller).is_ok());
        assert!(matches!(require_admin(&caller), Err(AppError::Unauthorized)));
    }

    #[test]
    fn worker_reads_only_own_records() {
        let worker = user(UserRole::Worker);
        let own_id = worker.id.unwrap();
        let caller = Caller::from(worker);
        assert!(require_admin_or_self(&caller, &own_id).is_ok());
        assert!(matches!(
            require_admin_or_self(&caller, &ObjectId::new()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn admin_reads_any_worker() {
        let caller = Caller::from(user(UserRole::Admin));
        assert!(caller.is_admin());
        assert!(require_admin_or_self(&caller, &ObjectId::new()).is_ok());
    }
}

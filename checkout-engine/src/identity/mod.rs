//! Identity service
//!
//! Registers and authenticates the single local account and keeps the
//! current-session pointer. This is an explicit service instance holding
//! its store; there is no ambient global session.
//!
//! Password policy is a stub on purpose: registration only checks length,
//! and login only checks that a password was supplied at all. No hash is
//! stored or verified. Real credential handling is out of scope.

use crate::common::{CoreError, CoreResult};
use crate::store::{self, KvStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::User;
use std::sync::Arc;

const USERS_KEY: &str = "checkout_app_users";
const CURRENT_USER_KEY: &str = "checkout_app_current_user";

const MIN_PASSWORD_LEN: usize = 6;

/// Partial profile update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Account registry and session pointer over the store
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn KvStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn users(&self) -> CoreResult<Vec<User>> {
        Ok(store::read_list(self.store.as_ref(), USERS_KEY)?)
    }

    fn save_users(&self, users: &[User]) -> CoreResult<()> {
        Ok(store::write_list(self.store.as_ref(), USERS_KEY, users)?)
    }

    fn set_current(&self, user: &User) -> CoreResult<()> {
        Ok(store::write_opt(self.store.as_ref(), CURRENT_USER_KEY, user)?)
    }

    /// Register a new account and set it as the session user
    ///
    /// Fails with `Validation` on blank fields or a short password, and
    /// with `DuplicateEmail` when the case-folded email already exists.
    pub fn register(&self, name: &str, email: &str, password: &str) -> CoreResult<User> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() || email.is_empty() || password.trim().is_empty() {
            return Err(CoreError::Validation("all fields are required".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(CoreError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut users = self.users()?;
        if users.iter().any(|u| u.email == email) {
            return Err(CoreError::DuplicateEmail(email));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            created_at: Utc::now(),
        };

        users.push(user.clone());
        self.save_users(&users)?;
        self.set_current(&user)?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Log an existing account in and set it as the session user
    ///
    /// Stub policy: the password is only required to be non-blank, it is
    /// never matched against anything.
    pub fn login(&self, email: &str, password: &str) -> CoreResult<User> {
        let email = normalize_email(email);

        let users = self.users()?;
        let user = users
            .into_iter()
            .find(|u| u.email == email)
            .ok_or_else(|| CoreError::NotFound(format!("no account for {}", email)))?;

        if password.trim().is_empty() {
            return Err(CoreError::Validation("password is required".into()));
        }

        self.set_current(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Clear the session pointer; idempotent
    pub fn logout(&self) -> CoreResult<()> {
        self.store.remove(CURRENT_USER_KEY)?;
        Ok(())
    }

    pub fn current_user(&self) -> CoreResult<Option<User>> {
        Ok(store::read_opt(self.store.as_ref(), CURRENT_USER_KEY)?)
    }

    pub fn is_authenticated(&self) -> CoreResult<bool> {
        Ok(self.current_user()?.is_some())
    }

    /// Apply a partial profile update
    ///
    /// Fails with `NotFound` for an unknown id and `DuplicateEmail` when
    /// the new email collides with a different account. Refreshes the
    /// session pointer when it names the updated account.
    pub fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> CoreResult<User> {
        let mut users = self.users()?;
        let idx = users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or_else(|| CoreError::NotFound(format!("user {}", user_id)))?;

        if let Some(email) = &update.email {
            let email = normalize_email(email);
            let taken = users.iter().any(|u| u.email == email && u.id != user_id);
            if taken {
                return Err(CoreError::DuplicateEmail(email));
            }
            users[idx].email = email;
        }
        if let Some(name) = update.name {
            users[idx].name = name;
        }

        let updated = users[idx].clone();
        self.save_users(&users)?;

        if let Some(current) = self.current_user()?
            && current.id == user_id
        {
            self.set_current(&updated)?;
        }

        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(updated)
    }

    /// Change the account password (stub, nothing is stored)
    pub fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> CoreResult<()> {
        let users = self.users()?;
        if !users.iter().any(|u| u.id == user_id) {
            return Err(CoreError::NotFound(format!("user {}", user_id)));
        }
        if current_password.trim().is_empty() {
            return Err(CoreError::Validation("current password is required".into()));
        }
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(CoreError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }

    /// Wipe the account collection and the session pointer (maintenance)
    pub fn clear_all(&self) -> CoreResult<()> {
        self.store.remove(USERS_KEY)?;
        self.store.remove(CURRENT_USER_KEY)?;
        Ok(())
    }
}

/// Case-fold and trim an email for the uniqueness check
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

//! In-process [`UserStore`] for single-instance deployments and tests.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::auth::{StoreError, UserStore};
use crate::types::{Email, NewUser, User};

/// Users held in memory, keyed by email.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Email, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant or revoke the admin flag. Admin status never comes from the
    /// identity provider.
    ///
    /// # Errors
    ///
    /// Fails if no user has this email.
    pub async fn set_admin(&self, email: &Email, admin: bool) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(email)
            .ok_or_else(|| format!("no user with email {email}"))?;
        user.admin = admin;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        // Check and insert under one write guard.
        let mut users = self.users.write().await;
        let stored = match users.entry(user.email.clone()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot
                .insert(user.into_user(OffsetDateTime::now_utc()))
                .clone(),
        };
        Ok(stored)
    }
}

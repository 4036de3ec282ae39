//! In-memory user directory backing the demo routes.
//!
//! Stands in for the database collaborator: every call is async and is
//! timed by the routes through the database logger.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::http::HandlerError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => HandlerError::Conflict(err.to_string()),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    // Demo only; not a password hash fit for production.
    password_digest: u64,
}

#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(
        &self,
        email: &str,
        name: Option<String>,
        password: &str,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.user.email.eq_ignore_ascii_case(email)) {
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let user = User {
            id: id.clone(),
            email: email.to_string(),
            name,
        };
        users.insert(
            id.clone(),
            StoredUser {
                user: user.clone(),
                password_digest: digest(&id, password),
            },
        );
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).map(|u| u.user.clone()))
    }

    /// The user whose email and password match, if any.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| {
                u.user.email.eq_ignore_ascii_case(email)
                    && u.password_digest == digest(&u.user.id, password)
            })
            .map(|u| u.user.clone()))
    }
}

fn digest(salt: &str, password: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    salt.hash(&mut hasher);
    password.hash(&mut hasher);
    hasher.finish()
}

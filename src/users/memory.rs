use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, ProfileUpdate, User},
};

/// In-process user store for tests and local runs without Postgres.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            date_of_birth: user.date_of_birth,
            mobile_number: user.mobile_number,
            hashed_password: user.hashed_password,
            is_admin: user.is_admin,
            jwt: user.jwt,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn record_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.iter_mut().find(|u| u.id == id) {
            row.jwt = Some(token.to_string());
        }
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.id != id && u.email == update.email) {
            return Err(StoreError::Duplicate);
        }
        let Some(row) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        row.name = update.name;
        row.email = update.email;
        row.date_of_birth = update.date_of_birth;
        row.mobile_number = update.mobile_number;
        Ok(Some(row.clone()))
    }

    async fn list_by_name(&self) -> Result<Vec<User>, StoreError> {
        let mut users = self.rows.read().await.clone();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }
}

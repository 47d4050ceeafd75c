use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::repo_types::{NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str =
    "id, name, email, date_of_birth, mobile_number, hashed_password, is_admin, jwt, created_at";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    Duplicate,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Database(err),
        }
    }
}

/// Persistence boundary for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn record_token(&self, id: Uuid, token: &str) -> Result<(), StoreError>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>, StoreError>;
    /// All users ordered by the bytes of their name, so `Zed` sorts before `al`.
    async fn list_by_name(&self) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, date_of_birth, mobile_number, hashed_password, is_admin, jwt)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.date_of_birth)
        .bind(&user.mobile_number)
        .bind(&user.hashed_password)
        .bind(user.is_admin)
        .bind(&user.jwt)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn record_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET jwt = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, date_of_birth = $4, mobile_number = $5
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.date_of_birth)
        .bind(&update.mobile_number)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list_by_name(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY name COLLATE \"C\" ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }
}

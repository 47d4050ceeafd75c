use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub date_of_birth: Date,
    pub mobile_number: String,
    pub hashed_password: String, // Argon2 PHC string
    pub is_admin: bool,
    pub jwt: Option<String>, // last issued token, never used for validation
    pub created_at: OffsetDateTime,
}

/// Row to insert at signup.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub date_of_birth: Date,
    pub mobile_number: String,
    pub hashed_password: String,
    pub is_admin: bool,
    pub jwt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub date_of_birth: Date,
    pub mobile_number: String,
}

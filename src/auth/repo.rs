use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Travel preferences kept on the profile; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_airlines: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_class: Option<String>,
}

impl Preferences {
    /// Overlays the fields present in `update`, keeping the rest.
    pub fn merge(&mut self, update: Preferences) {
        if update.seat_type.is_some() {
            self.seat_type = update.seat_type;
        }
        if update.meal_preference.is_some() {
            self.meal_preference = update.meal_preference;
        }
        if update.preferred_airlines.is_some() {
            self.preferred_airlines = update.preferred_airlines;
        }
        if update.preferred_class.is_some() {
            self.preferred_class = update.preferred_class;
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferences: Json<Preferences>,
    pub created_at: OffsetDateTime,
}

/// Fields a user may change on their own profile, already validated.
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub preferences: Preferences,
}

impl User {
    /// Find a user by (lower-cased) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, phone, address, preferences, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, phone, address, preferences, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    /// Create a new user with hashed password and the default role.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, phone, address, preferences, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2, email = $3, phone = $4, address = $5, preferences = $6
             WHERE id = $1
            RETURNING id, name, email, password_hash, role, phone, address, preferences, created_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.address)
        .bind(Json(&changes.preferences))
        .fetch_optional(db)
        .await
    }
}

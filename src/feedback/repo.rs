use anyhow::Context;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Feedback form as posted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub rating: i16,
}

pub async fn insert(db: &PgPool, user_id: Option<Uuid>, f: &NewFeedback) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO feedback (id, user_id, name, email, subject, message, rating)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(user_id) // Option<Uuid> → NULL for anonymous feedback
    .bind(&f.name)
    .bind(&f.email)
    .bind(&f.subject)
    .bind(&f.message)
    .bind(f.rating)
    .execute(db)
    .await
    .context("insert feedback")?;
    Ok(id)
}

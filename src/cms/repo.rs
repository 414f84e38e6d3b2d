use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

pub const CONTENT_TYPES: [&str; 5] = ["about", "faq", "terms", "privacy", "contact"];

/// A CMS page. Only `published` rows are ever read here.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(rename = "content")]
    pub body: String,
    pub content_type: String,
    pub status: String,
    pub featured_image: String,
    pub meta_title: String,
    pub meta_description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn list_published(
    db: &PgPool,
    content_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<(Vec<Content>, i64)> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
          FROM content
         WHERE status = 'published'
           AND ($1::text IS NULL OR content_type = $1)
        "#,
    )
    .bind(content_type)
    .fetch_one(db)
    .await
    .context("count published content")?;

    let rows = sqlx::query_as::<_, Content>(
        r#"
        SELECT id, title, slug, body, content_type, status, featured_image,
               meta_title, meta_description, created_at, updated_at
          FROM content
         WHERE status = 'published'
           AND ($1::text IS NULL OR content_type = $1)
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(content_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list published content")?;

    Ok((rows, total))
}

pub async fn find_published_by_slug(db: &PgPool, slug: &str) -> anyhow::Result<Option<Content>> {
    let row = sqlx::query_as::<_, Content>(
        r#"
        SELECT id, title, slug, body, content_type, status, featured_image,
               meta_title, meta_description, created_at, updated_at
          FROM content
         WHERE slug = $1 AND status = 'published'
        "#,
    )
    .bind(slug)
    .fetch_optional(db)
    .await
    .context("get content by slug")?;
    Ok(row)
}

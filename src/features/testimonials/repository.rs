use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::testimonials::models::{NewTestimonial, Testimonial};

/// Persistence for testimonials
#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn insert(&self, testimonial: &NewTestimonial) -> Result<Testimonial>;

    /// Most recent approved testimonials, newest first
    async fn list_approved(&self, limit: i64) -> Result<Vec<Testimonial>>;

    /// Testimonials awaiting moderation, newest first
    async fn list_pending(&self) -> Result<Vec<Testimonial>>;

    /// Mark as approved. `None` when no testimonial has this id.
    async fn approve(&self, id: Uuid) -> Result<Option<Testimonial>>;
}

/// PostgreSQL-backed testimonial repository
pub struct PgTestimonialRepository {
    pool: PgPool,
}

impl PgTestimonialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestimonialRepository for PgTestimonialRepository {
    async fn insert(&self, testimonial: &NewTestimonial) -> Result<Testimonial> {
        let created = sqlx::query_as::<_, Testimonial>(
            r#"
            INSERT INTO testimonials (id, text, rating, author)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, rating, author, approved, created_at
            "#,
        )
        .bind(testimonial.id)
        .bind(&testimonial.text)
        .bind(testimonial.rating)
        .bind(&testimonial.author)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_approved(&self, limit: i64) -> Result<Vec<Testimonial>> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            r#"
            SELECT id, text, rating, author, approved, created_at
            FROM testimonials
            WHERE approved = TRUE
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(testimonials)
    }

    async fn list_pending(&self) -> Result<Vec<Testimonial>> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            r#"
            SELECT id, text, rating, author, approved, created_at
            FROM testimonials
            WHERE approved = FALSE
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(testimonials)
    }

    async fn approve(&self, id: Uuid) -> Result<Option<Testimonial>> {
        let testimonial = sqlx::query_as::<_, Testimonial>(
            r#"
            UPDATE testimonials
            SET approved = TRUE
            WHERE id = $1
            RETURNING id, text, rating, author, approved, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(testimonial)
    }
}

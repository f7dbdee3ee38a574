use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a testimonial
#[derive(Debug, Clone, FromRow)]
pub struct Testimonial {
    pub id: Uuid,
    pub text: String,
    /// 1 to 5
    pub rating: i16,
    pub author: String,
    /// Only approved testimonials are listed publicly
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new testimonial; always stored unapproved
#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub id: Uuid,
    pub text: String,
    pub rating: i16,
    pub author: String,
}

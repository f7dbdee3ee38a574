use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::testimonials::models::Testimonial;
use crate::shared::constants::{MAX_SENDER_LENGTH, MAX_TESTIMONIAL_LENGTH};
use crate::shared::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialResponseDto {
    pub id: Uuid,
    pub text: String,
    pub rating: i16,
    pub author: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Testimonial> for TestimonialResponseDto {
    fn from(t: Testimonial) -> Self {
        Self {
            id: t.id,
            text: t.text,
            rating: t.rating,
            author: t.author,
            approved: t.approved,
            created_at: t.created_at,
        }
    }
}

// Create request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTestimonialDto {
    #[validate(
        custom(function = "not_blank", message = "Testimonial text is required"),
        length(max = MAX_TESTIMONIAL_LENGTH, message = "Testimonial is too long")
    )]
    #[schema(example = "The officers followed up within a day.")]
    pub text: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i16,

    /// Defaults to "Anonymous" when missing or blank
    #[validate(length(max = MAX_SENDER_LENGTH, message = "Author name is too long"))]
    pub author: Option<String>,
}

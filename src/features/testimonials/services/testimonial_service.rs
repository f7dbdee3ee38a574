use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::testimonials::dtos::CreateTestimonialDto;
use crate::features::testimonials::models::{NewTestimonial, Testimonial};
use crate::features::testimonials::repository::TestimonialRepository;
use crate::shared::constants::{DEFAULT_TESTIMONIAL_AUTHOR, PUBLIC_TESTIMONIAL_LIMIT};

/// Service for testimonial submission and moderation
pub struct TestimonialService {
    repository: Arc<dyn TestimonialRepository>,
}

impl TestimonialService {
    pub fn new(repository: Arc<dyn TestimonialRepository>) -> Self {
        Self { repository }
    }

    /// Latest approved testimonials for the public page
    pub async fn list_approved(&self) -> Result<Vec<Testimonial>> {
        self.repository.list_approved(PUBLIC_TESTIMONIAL_LIMIT).await
    }

    /// Store a new testimonial. It stays hidden until approved.
    pub async fn create(&self, dto: CreateTestimonialDto) -> Result<Testimonial> {
        dto.validate()?;

        let author = dto
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_TESTIMONIAL_AUTHOR)
            .to_string();

        let testimonial = self
            .repository
            .insert(&NewTestimonial {
                id: Uuid::now_v7(),
                text: dto.text.trim().to_string(),
                rating: dto.rating,
                author,
            })
            .await?;

        info!("Testimonial {} submitted for moderation", testimonial.id);
        Ok(testimonial)
    }

    pub async fn list_pending(&self) -> Result<Vec<Testimonial>> {
        self.repository.list_pending().await
    }

    /// Approving an already approved testimonial is a no-op
    pub async fn approve(&self, id: Uuid, moderator: &str) -> Result<Testimonial> {
        let testimonial = self
            .repository
            .approve(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Testimonial {} not found", id)))?;

        info!("Testimonial {} approved by {}", id, moderator);
        Ok(testimonial)
    }
}

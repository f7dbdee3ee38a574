use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, IdPath};
use crate::features::auth::guards::RequireOfficer;
use crate::features::testimonials::dtos::{CreateTestimonialDto, TestimonialResponseDto};
use crate::features::testimonials::services::TestimonialService;
use crate::shared::types::ApiResponse;

/// List the latest approved testimonials
#[utoipa::path(
    get,
    path = "/api/testimonials",
    responses(
        (status = 200, description = "Up to 10 approved testimonials, newest first", body = ApiResponse<Vec<TestimonialResponseDto>>)
    ),
    tag = "testimonials"
)]
pub async fn list_approved_testimonials(
    State(service): State<Arc<TestimonialService>>,
) -> Result<Json<ApiResponse<Vec<TestimonialResponseDto>>>> {
    let testimonials = service.list_approved().await?;
    let dtos: Vec<TestimonialResponseDto> = testimonials.into_iter().map(|t| t.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Submit a testimonial for moderation
#[utoipa::path(
    post,
    path = "/api/testimonials",
    request_body = CreateTestimonialDto,
    responses(
        (status = 201, description = "Testimonial stored, pending approval", body = ApiResponse<TestimonialResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "testimonials"
)]
pub async fn create_testimonial(
    State(service): State<Arc<TestimonialService>>,
    AppJson(dto): AppJson<CreateTestimonialDto>,
) -> Result<(StatusCode, Json<ApiResponse<TestimonialResponseDto>>)> {
    let testimonial = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(testimonial.into()),
            Some("Thank you! Your testimonial will appear once approved.".to_string()),
            None,
        )),
    ))
}

/// List testimonials awaiting approval (officer only)
#[utoipa::path(
    get,
    path = "/api/testimonials/pending",
    responses(
        (status = 200, description = "Unapproved testimonials, newest first", body = ApiResponse<Vec<TestimonialResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Officer access required")
    ),
    security(("bearer_auth" = [])),
    tag = "testimonials"
)]
pub async fn list_pending_testimonials(
    RequireOfficer(_officer): RequireOfficer,
    State(service): State<Arc<TestimonialService>>,
) -> Result<Json<ApiResponse<Vec<TestimonialResponseDto>>>> {
    let testimonials = service.list_pending().await?;
    let dtos: Vec<TestimonialResponseDto> = testimonials.into_iter().map(|t| t.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Approve a testimonial (officer only)
#[utoipa::path(
    patch,
    path = "/api/testimonials/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Testimonial ID")
    ),
    responses(
        (status = 200, description = "Testimonial approved", body = ApiResponse<TestimonialResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Officer access required"),
        (status = 404, description = "Testimonial not found")
    ),
    security(("bearer_auth" = [])),
    tag = "testimonials"
)]
pub async fn approve_testimonial(
    RequireOfficer(officer): RequireOfficer,
    State(service): State<Arc<TestimonialService>>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<TestimonialResponseDto>>> {
    let testimonial = service.approve(id, &officer.user_id).await?;
    Ok(Json(ApiResponse::success(
        Some(testimonial.into()),
        Some("Testimonial approved".to_string()),
        None,
    )))
}

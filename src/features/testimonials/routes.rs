use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};

use crate::core::middleware::auth_middleware;
use crate::features::auth::JwtValidator;
use crate::features::testimonials::handlers::{
    approve_testimonial, create_testimonial, list_approved_testimonials,
    list_pending_testimonials,
};
use crate::features::testimonials::services::TestimonialService;

/// Public routes for reading and submitting testimonials
///
/// Testimonials get their own `/api/testimonials` prefix instead of sharing
/// the bare `/api` root; see the routing decisions in DESIGN.md.
pub fn public_routes(testimonial_service: Arc<TestimonialService>) -> Router {
    Router::new()
        .route(
            "/api/testimonials",
            get(list_approved_testimonials).post(create_testimonial),
        )
        .with_state(testimonial_service)
}

/// Moderation routes (officer only)
pub fn moderation_routes(
    testimonial_service: Arc<TestimonialService>,
    jwt_validator: Arc<JwtValidator>,
) -> Router {
    Router::new()
        .route("/api/testimonials/pending", get(list_pending_testimonials))
        .route("/api/testimonials/{id}/approve", patch(approve_testimonial))
        .route_layer(from_fn_with_state(jwt_validator, auth_middleware))
        .with_state(testimonial_service)
}

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::reports::{dtos as reports_dtos, handlers as reports_handlers};
use crate::features::testimonials::{
    dtos as testimonials_dtos, handlers as testimonials_handlers,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::submit_report,
        reports_handlers::list_own_reports,
        reports_handlers::list_all_reports,
        reports_handlers::get_report,
        reports_handlers::delete_report,
        reports_handlers::add_message,
        // Testimonials
        testimonials_handlers::list_approved_testimonials,
        testimonials_handlers::create_testimonial,
        testimonials_handlers::list_pending_testimonials,
        testimonials_handlers::approve_testimonial,
    ),
    components(
        schemas(
            Meta,
            // Reports
            reports_dtos::ReportResponseDto,
            reports_dtos::ReportFileDto,
            reports_dtos::ReportMessageDto,
            reports_dtos::SubmitReportUploadDto,
            reports_dtos::SubmitReportResponseDto,
            reports_dtos::CreateMessageDto,
            reports_dtos::DeleteReportResponseDto,
            ApiResponse<reports_dtos::SubmitReportResponseDto>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::ReportMessageDto>,
            ApiResponse<reports_dtos::DeleteReportResponseDto>,
            // Testimonials
            testimonials_dtos::TestimonialResponseDto,
            testimonials_dtos::CreateTestimonialDto,
            ApiResponse<testimonials_dtos::TestimonialResponseDto>,
            ApiResponse<Vec<testimonials_dtos::TestimonialResponseDto>>,
        )
    ),
    tags(
        (name = "reports", description = "Crime report submission, tracking and support chat"),
        (name = "testimonials", description = "Public testimonials and their moderation"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Crime Report API",
        version = "0.1.0",
        description = "API documentation for the crime report service",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

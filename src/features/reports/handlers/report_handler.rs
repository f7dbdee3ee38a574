use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::config::UploadConfig;
use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, IdPath};
use crate::features::auth::guards::{OptionalUser, RequireOfficer};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    CreateMessageDto, DeleteReportResponseDto, IncomingFile, ReportMessageDto, ReportResponseDto,
    SubmitReportDto, SubmitReportResponseDto, SubmitReportUploadDto,
};
use crate::features::reports::services::{file_too_large, too_many_files, ReportService};
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
}

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart body: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", e))
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field.text().await.map_err(multipart_error)
}

/// Read one file part, refusing it as soon as it grows past the size limit
async fn read_file(mut field: Field<'_>, max_size: usize) -> Result<IncomingFile> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();

    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > max_size {
            return Err(file_too_large(&file_name, max_size));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(IncomingFile {
        file_name,
        content_type,
        data,
    })
}

/// Collect text fields and attachments from a submission form.
///
/// Upload limits are enforced here so an over-limit request is refused
/// before anything reaches storage.
async fn read_submission(
    multipart: &mut Multipart,
    limits: &UploadConfig,
) -> Result<(SubmitReportDto, Vec<IncomingFile>)> {
    let mut dto = SubmitReportDto::default();
    let mut files: Vec<IncomingFile> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "files" => {
                if files.len() >= limits.max_files {
                    return Err(too_many_files(limits.max_files));
                }
                let file = read_file(field, limits.max_file_size).await?;
                // Browsers send an empty part when no file was picked
                if file.file_name.is_empty() && file.data.is_empty() {
                    continue;
                }
                files.push(file);
            }
            "crimeType" => dto.crime_type = read_text(field).await?,
            "location" => dto.location = read_text(field).await?,
            "description" => dto.description = read_text(field).await?,
            "isAnonymous" => {
                dto.is_anonymous = read_text(field).await?.trim().eq_ignore_ascii_case("true")
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok((dto, files))
}

/// Submit a crime report
///
/// Accepts multipart/form-data. A valid bearer token attaches the caller as
/// owner unless `isAnonymous` is "true"; an invalid token is ignored.
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "reports",
    request_body(
        content = SubmitReportUploadDto,
        content_type = "multipart/form-data",
        description = "Report fields and up to 5 attachments",
    ),
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<SubmitReportResponseDto>),
        (status = 400, description = "Validation error or too many files"),
        (status = 413, description = "Attachment too large"),
        (status = 500, description = "Storage or database failure")
    ),
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn submit_report(
    OptionalUser(caller): OptionalUser,
    State(state): State<ReportState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SubmitReportResponseDto>>)> {
    let mut multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("Expected a multipart/form-data body: {}", e))
    })?;

    let limits = state.report_service.attachments().limits().clone();
    let (dto, files) = read_submission(&mut multipart, &limits).await?;

    // Detached so a client disconnect cannot abandon uploads half-way
    let service = Arc::clone(&state.report_service);
    let report = tokio::spawn(async move { service.submit(dto, files, caller.as_ref()).await })
        .await
        .map_err(|e| AppError::Internal(format!("Submission task failed: {}", e)))??;

    let response = SubmitReportResponseDto {
        reference_number: report.reference_number,
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("Report submitted successfully".to_string()),
            None,
        )),
    ))
}

/// List reports submitted by the authenticated user
#[utoipa::path(
    get,
    path = "/api/reports/user",
    responses(
        (status = 200, description = "Caller's reports, newest first", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_own_reports(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = state.report_service.list_own(&user.user_id).await?;
    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// List every report (officer only)
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "All reports, newest first", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Officer access required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_all_reports(
    RequireOfficer(user): RequireOfficer,
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = state.report_service.list_all(&user).await?;
    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Look up a report by reference number (public, case-insensitive)
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = String, Path, description = "Reference number")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<ReportState>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_by_reference(&reference).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Delete a report by internal id
///
/// Owners may delete their own reports; officers may delete any report.
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted", body = ApiResponse<DeleteReportResponseDto>),
        (status = 400, description = "Malformed report ID"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not allowed to delete this report"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn delete_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<DeleteReportResponseDto>>> {
    state.report_service.delete(id, &user).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteReportResponseDto { deleted: true }),
        Some("Report deleted successfully".to_string()),
        None,
    )))
}

/// Post a message to a report's support chat
#[utoipa::path(
    post,
    path = "/api/reports/{id}/messages",
    params(
        ("id" = String, Path, description = "Reference number")
    ),
    request_body = CreateMessageDto,
    responses(
        (status = 201, description = "Message appended", body = ApiResponse<ReportMessageDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn add_message(
    State(state): State<ReportState>,
    Path(reference): Path<String>,
    AppJson(dto): AppJson<CreateMessageDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportMessageDto>>)> {
    let message = state.report_service.append_message(&reference, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(message.into()), None, None)),
    ))
}

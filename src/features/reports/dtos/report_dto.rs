use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{Report, ReportFile, ReportMessage};
use crate::shared::constants::{MAX_MESSAGE_LENGTH, MAX_SENDER_LENGTH};
use crate::shared::validation::not_blank;

/// Response DTO for a report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub reference_number: String,
    pub crime_type: String,
    pub location: String,
    pub description: String,
    pub is_anonymous: bool,
    pub user_id: Option<String>,
    pub files: Vec<ReportFileDto>,
    pub messages: Vec<ReportMessageDto>,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            reference_number: r.reference_number,
            crime_type: r.crime_type,
            location: r.location,
            description: r.description,
            is_anonymous: r.is_anonymous,
            user_id: r.user_id,
            files: r.files.0.into_iter().map(ReportFileDto::from).collect(),
            messages: r.messages.0.into_iter().map(ReportMessageDto::from).collect(),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportFileDto {
    /// Public URL of the stored attachment
    pub url: String,
    pub original_name: String,
}

impl From<ReportFile> for ReportFileDto {
    fn from(f: ReportFile) -> Self {
        Self {
            url: f.url,
            original_name: f.original_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportMessageDto {
    pub text: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ReportMessage> for ReportMessageDto {
    fn from(m: ReportMessage) -> Self {
        Self {
            text: m.text,
            sender: m.sender,
            timestamp: m.timestamp,
        }
    }
}

/// Text fields of a report submission, collected from the multipart form
#[derive(Debug, Clone, Default, Validate)]
pub struct SubmitReportDto {
    #[validate(custom(function = "not_blank", message = "Crime type is required"))]
    pub crime_type: String,

    #[validate(custom(function = "not_blank", message = "Location is required"))]
    pub location: String,

    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,

    pub is_anonymous: bool,
}

/// Multipart body of `POST /api/reports`
/// Note: This struct is for Swagger UI documentation only.
/// The handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct SubmitReportUploadDto {
    #[schema(example = "Burglary")]
    pub crime_type: String,
    pub location: String,
    pub description: String,
    /// "true" to submit without recording ownership
    pub is_anonymous: Option<bool>,
    /// Up to 5 attachments of 10 MiB each; repeat the field per file
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportResponseDto {
    pub reference_number: String,
}

/// Request DTO for posting a support-chat message
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMessageDto {
    /// Message text
    #[validate(
        custom(function = "not_blank", message = "Message text is required"),
        length(max = MAX_MESSAGE_LENGTH, message = "Message is too long")
    )]
    pub message: String,

    #[validate(
        custom(function = "not_blank", message = "Sender is required"),
        length(max = MAX_SENDER_LENGTH, message = "Sender is too long")
    )]
    pub sender: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteReportResponseDto {
    pub deleted: bool,
}

/// One uploaded file as read from the multipart body
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

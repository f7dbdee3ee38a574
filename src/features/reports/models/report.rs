use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

/// Database model for a crime report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub reference_number: String,
    pub crime_type: String,
    pub location: String,
    pub description: String,
    pub is_anonymous: bool,
    /// Owning user; always `None` for anonymous reports
    pub user_id: Option<String>,
    pub files: Json<Vec<ReportFile>>,
    pub messages: Json<Vec<ReportMessage>>,
    pub created_at: DateTime<Utc>,
}

/// Attachment entry stored in the `files` JSONB array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    pub url: String,
    pub original_name: String,
}

/// Support-chat entry stored in the append-only `messages` JSONB array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMessage {
    pub text: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
}

/// Data for creating a new report
#[derive(Debug, Clone)]
pub struct NewReport {
    pub id: Uuid,
    pub reference_number: String,
    pub crime_type: String,
    pub location: String,
    pub description: String,
    pub is_anonymous: bool,
    pub user_id: Option<String>,
    pub files: Vec<ReportFile>,
}

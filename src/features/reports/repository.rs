use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::reports::models::{NewReport, Report, ReportMessage};

/// Persistence for reports.
///
/// Reference numbers are matched exactly; callers normalize them first.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a report. Fails with [`AppError::Conflict`] when the reference
    /// number is already taken.
    async fn insert(&self, report: &NewReport) -> Result<Report>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>>;

    async fn find_by_reference(&self, reference_number: &str) -> Result<Option<Report>>;

    /// Reports owned by `user_id`, newest first
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Report>>;

    /// Every report, newest first
    async fn list_all(&self) -> Result<Vec<Report>>;

    /// Returns `false` when no report had this id
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Atomically append to the report's message thread. Returns `false` when
    /// no report has this reference number.
    async fn append_message(&self, reference_number: &str, message: &ReportMessage)
        -> Result<bool>;
}

const REPORT_COLUMNS: &str = r#"
    id, reference_number, crime_type, location, description,
    is_anonymous, user_id, files, messages, created_at
"#;

/// PostgreSQL-backed report repository
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn insert(&self, report: &NewReport) -> Result<Report> {
        let query = format!(
            r#"
            INSERT INTO reports (id, reference_number, crime_type, location, description,
                                 is_anonymous, user_id, files)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {REPORT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Report>(&query)
            .bind(report.id)
            .bind(&report.reference_number)
            .bind(&report.crime_type)
            .bind(&report.location)
            .bind(&report.description)
            .bind(report.is_anonymous)
            .bind(&report.user_id)
            .bind(Json(&report.files))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!(
                        "Reference number {} already exists",
                        report.reference_number
                    ))
                } else {
                    tracing::error!("Failed to insert report: {:?}", e);
                    AppError::Database(e)
                }
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");

        Ok(sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_reference(&self, reference_number: &str) -> Result<Option<Report>> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE reference_number = $1");

        Ok(sqlx::query_as::<_, Report>(&query)
            .bind(reference_number)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Report>> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );

        Ok(sqlx::query_as::<_, Report>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC, id DESC");

        Ok(sqlx::query_as::<_, Report>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_message(
        &self,
        reference_number: &str,
        message: &ReportMessage,
    ) -> Result<bool> {
        // Single-statement append: the row lock orders concurrent appends
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET messages = messages || $2::jsonb
            WHERE reference_number = $1
            "#,
        )
        .bind(reference_number)
        .bind(Json([message]))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

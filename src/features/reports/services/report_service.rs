use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::AuthenticatedUser;
use crate::features::reports::dtos::{CreateMessageDto, IncomingFile, SubmitReportDto};
use crate::features::reports::models::{NewReport, Report, ReportMessage};
use crate::features::reports::policy;
use crate::features::reports::repository::ReportRepository;
use crate::features::reports::services::reference_number;
use crate::features::reports::services::AttachmentService;

/// Fresh reference numbers tried after a unique-constraint collision
const REFERENCE_RETRIES: usize = 3;

/// Service for report operations
pub struct ReportService {
    repository: Arc<dyn ReportRepository>,
    attachments: AttachmentService,
}

impl ReportService {
    pub fn new(repository: Arc<dyn ReportRepository>, attachments: AttachmentService) -> Self {
        Self {
            repository,
            attachments,
        }
    }

    pub fn attachments(&self) -> &AttachmentService {
        &self.attachments
    }

    /// Validate, store attachments, then persist the report.
    ///
    /// Nothing is persisted when validation or any upload fails. When the
    /// insert fails after uploads succeeded, the uploaded objects are removed.
    pub async fn submit(
        &self,
        dto: SubmitReportDto,
        files: Vec<IncomingFile>,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Report> {
        dto.validate()?;
        self.attachments.check_limits(&files)?;

        // Drawn before uploading so an entropy failure leaves nothing behind
        let mut reference = reference_number::generate()?;

        let uploaded = self.attachments.upload_all(files).await?;

        let mut new_report = NewReport {
            id: Uuid::now_v7(),
            reference_number: reference.clone(),
            crime_type: dto.crime_type.trim().to_string(),
            location: dto.location.trim().to_string(),
            description: dto.description.trim().to_string(),
            is_anonymous: dto.is_anonymous,
            user_id: policy::resolve_owner(dto.is_anonymous, caller),
            files: uploaded.files.clone(),
        };

        let mut retries = 0;
        let outcome = loop {
            match self.repository.insert(&new_report).await {
                Err(AppError::Conflict(msg)) if retries < REFERENCE_RETRIES => {
                    retries += 1;
                    warn!("Reference number collision ({}), regenerating", msg);
                    reference = match reference_number::generate() {
                        Ok(r) => r,
                        Err(e) => break Err(e),
                    };
                    new_report.reference_number = reference.clone();
                }
                other => break other,
            }
        };

        match outcome {
            Ok(report) => {
                info!(
                    "Created report {} ({} attachment(s), owned: {})",
                    report.reference_number,
                    report.files.len(),
                    report.user_id.is_some()
                );
                Ok(report)
            }
            Err(e) => {
                if !uploaded.keys().is_empty() {
                    error!(
                        "Persisting report {} failed after upload, removing {} object(s): {}",
                        reference,
                        uploaded.keys().len(),
                        e
                    );
                    self.attachments.discard(uploaded.keys()).await;
                }
                Err(e)
            }
        }
    }

    /// Reports owned by `user_id`, newest first
    pub async fn list_own(&self, user_id: &str) -> Result<Vec<Report>> {
        self.repository.list_by_user(user_id).await
    }

    /// Every report, newest first. Officer only.
    pub async fn list_all(&self, caller: &AuthenticatedUser) -> Result<Vec<Report>> {
        policy::authorize_list_all(caller)?;
        self.repository.list_all().await
    }

    /// Public lookup; the reference number is matched case-insensitively
    pub async fn get_by_reference(&self, reference: &str) -> Result<Report> {
        let reference = reference_number::normalize(reference);
        self.repository
            .find_by_reference(&reference)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", reference)))
    }

    /// Hard delete by internal id, then best-effort removal of attachments
    pub async fn delete(&self, id: Uuid, caller: &AuthenticatedUser) -> Result<()> {
        let report = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        policy::authorize_delete(&report, caller)?;

        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        info!(
            "Report {} deleted by {}",
            report.reference_number, caller.user_id
        );

        self.attachments.discard_files(&report.files).await;
        Ok(())
    }

    /// Append a support-chat message to the report's thread
    pub async fn append_message(
        &self,
        reference: &str,
        dto: CreateMessageDto,
    ) -> Result<ReportMessage> {
        dto.validate()?;
        let reference = reference_number::normalize(reference);

        let message = ReportMessage {
            text: dto.message,
            sender: dto.sender.trim().to_string(),
            timestamp: Utc::now(),
        };

        if !self.repository.append_message(&reference, &message).await? {
            return Err(AppError::NotFound(format!("Report {} not found", reference)));
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        incoming_file, officer, report_service, submission, user, InMemoryObjectStorage,
        InMemoryReportRepository,
    };

    struct Fixture {
        repository: Arc<InMemoryReportRepository>,
        storage: Arc<InMemoryObjectStorage>,
        service: ReportService,
    }

    fn fixture() -> Fixture {
        fixture_with(InMemoryObjectStorage::default())
    }

    fn fixture_with(storage: InMemoryObjectStorage) -> Fixture {
        let repository = Arc::new(InMemoryReportRepository::default());
        let storage = Arc::new(storage);
        let service = report_service(repository.clone(), storage.clone());
        Fixture {
            repository,
            storage,
            service,
        }
    }

    fn message(text: &str, sender: &str) -> CreateMessageDto {
        CreateMessageDto {
            message: text.to_string(),
            sender: sender.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submitted_report_is_found_case_insensitively() {
        let f = fixture();
        let report = f.service.submit(submission(false), vec![], None).await.unwrap();

        let lowered = report.reference_number.to_lowercase();
        let found = f
            .service
            .get_by_reference(&format!("  {} ", lowered))
            .await
            .unwrap();
        assert_eq!(found.id, report.id);
    }

    #[tokio::test]
    async fn test_repeated_submissions_get_distinct_references() {
        let f = fixture();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let report = f.service.submit(submission(false), vec![], None).await.unwrap();
            assert!(seen.insert(report.reference_number));
        }
    }

    #[tokio::test]
    async fn test_blank_fields_fail_validation_and_persist_nothing() {
        let f = fixture();
        for blank in ["", "   "] {
            let mut dto = submission(false);
            dto.description = blank.to_string();
            let err = f.service.submit(dto, vec![], None).await.unwrap_err();
            assert!(matches!(err, AppError::FieldValidation(_)));
        }

        let mut dto = submission(false);
        dto.crime_type = String::new();
        dto.location = String::new();
        let err = f.service.submit(dto, vec![], None).await.unwrap_err();
        let AppError::FieldValidation(errors) = err else {
            panic!("expected field validation error");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("crime_type"));
        assert!(fields.contains_key("location"));

        assert_eq!(f.repository.count().await, 0);
    }

    #[tokio::test]
    async fn test_six_files_rejected_before_any_upload() {
        let f = fixture();
        let files = (0..6)
            .map(|i| incoming_file(&format!("photo{}.jpg", i), 8))
            .collect();

        let err = f
            .service
            .submit(submission(false), files, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TooManyFiles(_)));
        assert_eq!(f.storage.put_count().await, 0);
        assert_eq!(f.repository.count().await, 0);
    }

    #[tokio::test]
    async fn test_anonymous_submission_drops_identity() {
        let f = fixture();
        let caller = user("user-1");

        let anonymous = f
            .service
            .submit(submission(true), vec![], Some(&caller))
            .await
            .unwrap();
        assert_eq!(anonymous.user_id, None);
        assert!(anonymous.is_anonymous);

        let owned = f
            .service
            .submit(submission(false), vec![], Some(&caller))
            .await
            .unwrap();
        assert_eq!(owned.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_attachments_recorded_in_order() {
        let f = fixture();
        let files = vec![incoming_file("a.jpg", 5), incoming_file("b.mp4", 6)];

        let report = f
            .service
            .submit(submission(false), files, None)
            .await
            .unwrap();

        let names: Vec<&str> = report
            .files
            .iter()
            .map(|file| file.original_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.mp4"]);
    }

    #[tokio::test]
    async fn test_failed_upload_persists_nothing() {
        let f = fixture_with(InMemoryObjectStorage::failing_on("b.mp4"));
        let files = vec![incoming_file("a.jpg", 5), incoming_file("b.mp4", 6)];

        let err = f
            .service
            .submit(submission(false), files, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(f.repository.count().await, 0);
        assert_eq!(f.storage.object_count().await, 0);
    }

    #[tokio::test]
    async fn test_persist_failure_removes_uploads() {
        let f = fixture();
        f.repository.fail_inserts(true);
        let files = vec![incoming_file("a.jpg", 5), incoming_file("b.mp4", 6)];

        let err = f
            .service
            .submit(submission(false), files, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(f.storage.put_count().await, 2);
        assert_eq!(f.storage.object_count().await, 0);
    }

    #[tokio::test]
    async fn test_reference_collision_is_retried() {
        let f = fixture();
        f.repository.conflict_next_inserts(REFERENCE_RETRIES);

        let report = f.service.submit(submission(false), vec![], None).await.unwrap();

        assert_eq!(f.repository.count().await, 1);
        assert!(f.service.get_by_reference(&report.reference_number).await.is_ok());
    }

    #[tokio::test]
    async fn test_persistent_collision_fails_with_conflict() {
        let f = fixture();
        f.repository.conflict_next_inserts(REFERENCE_RETRIES + 1);

        let err = f
            .service
            .submit(submission(false), vec![], None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(f.repository.count().await, 0);
    }

    #[tokio::test]
    async fn test_list_own_is_newest_first_and_scoped() {
        let f = fixture();
        let caller = user("user-1");
        let first = f
            .service
            .submit(submission(false), vec![], Some(&caller))
            .await
            .unwrap();
        let second = f
            .service
            .submit(submission(false), vec![], Some(&caller))
            .await
            .unwrap();
        f.service
            .submit(submission(false), vec![], Some(&user("user-2")))
            .await
            .unwrap();

        let own = f.service.list_own("user-1").await.unwrap();
        let ids: Vec<Uuid> = own.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_list_all_requires_officer() {
        let f = fixture();
        f.service.submit(submission(true), vec![], None).await.unwrap();

        let err = f.service.list_all(&user("user-1")).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let all = f.service.list_all(&officer("officer-1")).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_other_user_is_forbidden_and_keeps_record() {
        let f = fixture();
        let report = f
            .service
            .submit(submission(false), vec![], Some(&user("user-1")))
            .await
            .unwrap();

        let err = f
            .service
            .delete(report.id, &user("user-2"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(f.service.get_by_reference(&report.reference_number).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_report_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .delete(Uuid::now_v7(), &officer("officer-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_owner_delete_removes_record_and_attachments() {
        let f = fixture();
        let caller = user("user-1");
        let report = f
            .service
            .submit(
                submission(false),
                vec![incoming_file("a.jpg", 5)],
                Some(&caller),
            )
            .await
            .unwrap();

        f.service.delete(report.id, &caller).await.unwrap();

        assert_eq!(f.repository.count().await, 0);
        assert_eq!(f.storage.object_count().await, 0);
    }

    #[tokio::test]
    async fn test_officer_can_delete_unowned_report() {
        let f = fixture();
        let report = f.service.submit(submission(true), vec![], None).await.unwrap();

        let err = f
            .service
            .delete(report.id, &user("user-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        f.service
            .delete(report.id, &officer("officer-1"))
            .await
            .unwrap();
        assert_eq!(f.repository.count().await, 0);
    }

    #[tokio::test]
    async fn test_messages_keep_arrival_order() {
        let f = fixture();
        let report = f.service.submit(submission(true), vec![], None).await.unwrap();

        f.service
            .append_message(&report.reference_number, message("first", "citizen"))
            .await
            .unwrap();
        f.service
            .append_message(
                &report.reference_number.to_lowercase(),
                message("second", "officer"),
            )
            .await
            .unwrap();

        let stored = f
            .service
            .get_by_reference(&report.reference_number)
            .await
            .unwrap();
        let texts: Vec<&str> = stored.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_message_to_unknown_report_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .append_message("NOPE", message("hello", "citizen"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let f = fixture();
        let report = f.service.submit(submission(true), vec![], None).await.unwrap();

        let err = f
            .service
            .append_message(&report.reference_number, message("  ", "citizen"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FieldValidation(_)));

        let stored = f
            .service
            .get_by_reference(&report.reference_number)
            .await
            .unwrap();
        assert!(stored.messages.is_empty());
    }
}

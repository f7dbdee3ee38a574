//! Fixtures shared by unit and router tests: identities, signed tokens, and
//! in-memory stand-ins for the database and object storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::multipart::MultipartForm;
use axum_test::TestServer;
use chrono::Utc;
use fake::faker::address::en::StreetName;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::config::{AuthConfig, UploadConfig};
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Claims};
use crate::features::auth::JwtValidator;
use crate::features::reports::dtos::{IncomingFile, SubmitReportDto};
use crate::features::reports::models::{NewReport, Report, ReportMessage};
use crate::features::reports::repository::ReportRepository;
use crate::features::reports::routes as report_routes;
use crate::features::reports::services::{AttachmentService, ReportService};
use crate::features::testimonials::models::{NewTestimonial, Testimonial};
use crate::features::testimonials::repository::TestimonialRepository;
use crate::features::testimonials::routes as testimonial_routes;
use crate::features::testimonials::services::TestimonialService;
use crate::modules::storage::{ObjectStorage, StoredObject};

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        issuer: None,
        audience: None,
        jwt_leeway: Duration::from_secs(0),
    }
}

/// Sign a token the way the identity provider would
pub fn mint_token(user_id: &str, roles: &[&str]) -> String {
    let claims = Claims {
        user_id: Some(user_id.to_string()),
        sub: None,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: (Utc::now().timestamp() + 3600) as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("failed to sign test token")
}

pub fn user(user_id: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: user_id.to_string(),
        roles: vec![],
    }
}

pub fn officer(user_id: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: user_id.to_string(),
        roles: vec!["officer".to_string()],
    }
}

pub fn sample_report(owner: Option<&str>) -> Report {
    Report {
        id: Uuid::now_v7(),
        reference_number: "0ABCDEFGH12345678".to_string(),
        crime_type: "Vandalism".to_string(),
        location: StreetName().fake(),
        description: Sentence(5..12).fake(),
        is_anonymous: owner.is_none(),
        user_id: owner.map(str::to_string),
        files: Json(vec![]),
        messages: Json(vec![]),
        created_at: Utc::now(),
    }
}

/// Valid submission fields with generated text
pub fn submission(is_anonymous: bool) -> SubmitReportDto {
    SubmitReportDto {
        crime_type: "Burglary".to_string(),
        location: StreetName().fake(),
        description: Sentence(5..12).fake(),
        is_anonymous,
    }
}

pub fn incoming_file(name: &str, size: usize) -> IncomingFile {
    IncomingFile {
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        data: vec![0xAB; size],
    }
}

/// Multipart body carrying every required text field and no files
pub fn submission_form() -> MultipartForm {
    let description: String = Sentence(5..12).fake();
    let location: String = StreetName().fake();
    MultipartForm::new()
        .add_text("crimeType", "Burglary")
        .add_text("location", location)
        .add_text("description", description)
}

// =============================================================================
// IN-MEMORY REPORT REPOSITORY
// =============================================================================

/// Report store kept in insertion order
#[derive(Default)]
pub struct InMemoryReportRepository {
    reports: RwLock<Vec<Report>>,
    fail_inserts: AtomicBool,
    pending_conflicts: AtomicUsize,
}

impl InMemoryReportRepository {
    pub async fn count(&self) -> usize {
        self.reports.read().await.len()
    }

    /// Make every insert fail with a database error
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make the next `n` inserts fail as reference-number collisions
    pub fn conflict_next_inserts(&self, n: usize) {
        self.pending_conflicts.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn insert(&self, report: &NewReport) -> Result<Report> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let forced_conflict = self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        let mut reports = self.reports.write().await;
        if forced_conflict
            || reports
                .iter()
                .any(|r| r.reference_number == report.reference_number)
        {
            return Err(AppError::Conflict(format!(
                "Reference number {} already exists",
                report.reference_number
            )));
        }

        let stored = Report {
            id: report.id,
            reference_number: report.reference_number.clone(),
            crime_type: report.crime_type.clone(),
            location: report.location.clone(),
            description: report.description.clone(),
            is_anonymous: report.is_anonymous,
            user_id: report.user_id.clone(),
            files: Json(report.files.clone()),
            messages: Json(vec![]),
            created_at: Utc::now(),
        };
        reports.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let reports = self.reports.read().await;
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_reference(&self, reference_number: &str) -> Result<Option<Report>> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .find(|r| r.reference_number == reference_number)
            .cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Report>> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .rev()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        let reports = self.reports.read().await;
        Ok(reports.iter().rev().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut reports = self.reports.write().await;
        let before = reports.len();
        reports.retain(|r| r.id != id);
        Ok(reports.len() < before)
    }

    async fn append_message(
        &self,
        reference_number: &str,
        message: &ReportMessage,
    ) -> Result<bool> {
        let mut reports = self.reports.write().await;
        match reports
            .iter_mut()
            .find(|r| r.reference_number == reference_number)
        {
            Some(report) => {
                report.messages.0.push(message.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// =============================================================================
// IN-MEMORY OBJECT STORAGE
// =============================================================================

const MEMORY_URL_BASE: &str = "memory://attachments/";

#[derive(Default)]
struct StorageState {
    objects: HashMap<String, String>,
    puts: usize,
    deleted: Vec<String>,
}

/// Object storage double that records every call
#[derive(Default)]
pub struct InMemoryObjectStorage {
    state: RwLock<StorageState>,
    fail_suffix: Option<String>,
}

impl InMemoryObjectStorage {
    /// Uploads of files named `name` fail; all others succeed
    pub fn failing_on(name: &str) -> Self {
        Self {
            state: RwLock::default(),
            fail_suffix: Some(format!("-{}", name)),
        }
    }

    /// Objects currently stored
    pub async fn object_count(&self) -> usize {
        self.state.read().await.objects.len()
    }

    /// Successful uploads, including ones removed since
    pub async fn put_count(&self) -> usize {
        self.state.read().await.puts
    }

    pub async fn deleted_keys(&self) -> Vec<String> {
        self.state.read().await.deleted.clone()
    }

    pub async fn content_types(&self) -> Vec<String> {
        self.state.read().await.objects.values().cloned().collect()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put_public(
        &self,
        path: &str,
        _data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject> {
        if let Some(suffix) = &self.fail_suffix {
            if path.ends_with(suffix.as_str()) {
                return Err(AppError::Storage(format!("Simulated failure for {}", path)));
            }
        }

        let key = format!("public/{}", path);
        let mut state = self.state.write().await;
        state.objects.insert(key.clone(), content_type.to_string());
        state.puts += 1;

        Ok(StoredObject {
            url: format!("{}{}", MEMORY_URL_BASE, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.objects.remove(key);
        state.deleted.push(key.to_string());
        Ok(())
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(MEMORY_URL_BASE).map(str::to_string)
    }
}

// =============================================================================
// IN-MEMORY TESTIMONIAL REPOSITORY
// =============================================================================

#[derive(Default)]
pub struct InMemoryTestimonialRepository {
    testimonials: RwLock<Vec<Testimonial>>,
}

#[async_trait]
impl TestimonialRepository for InMemoryTestimonialRepository {
    async fn insert(&self, testimonial: &NewTestimonial) -> Result<Testimonial> {
        let stored = Testimonial {
            id: testimonial.id,
            text: testimonial.text.clone(),
            rating: testimonial.rating,
            author: testimonial.author.clone(),
            approved: false,
            created_at: Utc::now(),
        };
        self.testimonials.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_approved(&self, limit: i64) -> Result<Vec<Testimonial>> {
        let testimonials = self.testimonials.read().await;
        Ok(testimonials
            .iter()
            .rev()
            .filter(|t| t.approved)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_pending(&self) -> Result<Vec<Testimonial>> {
        let testimonials = self.testimonials.read().await;
        Ok(testimonials
            .iter()
            .rev()
            .filter(|t| !t.approved)
            .cloned()
            .collect())
    }

    async fn approve(&self, id: Uuid) -> Result<Option<Testimonial>> {
        let mut testimonials = self.testimonials.write().await;
        Ok(testimonials.iter_mut().find(|t| t.id == id).map(|t| {
            t.approved = true;
            t.clone()
        }))
    }
}

// =============================================================================
// SERVICES & ROUTERS
// =============================================================================

pub fn report_service(
    repository: Arc<InMemoryReportRepository>,
    storage: Arc<InMemoryObjectStorage>,
) -> ReportService {
    ReportService::new(
        repository,
        AttachmentService::new(storage, UploadConfig::default()),
    )
}

pub struct ReportTestContext {
    pub server: TestServer,
    pub repository: Arc<InMemoryReportRepository>,
    pub storage: Arc<InMemoryObjectStorage>,
    pub limits: UploadConfig,
}

/// Report routes wired to in-memory backends, with a 1 KiB file limit
pub fn report_test_server() -> ReportTestContext {
    let repository = Arc::new(InMemoryReportRepository::default());
    let storage = Arc::new(InMemoryObjectStorage::default());
    let limits = UploadConfig {
        max_files: 5,
        max_file_size: 1024,
    };

    let service = Arc::new(ReportService::new(
        repository.clone(),
        AttachmentService::new(storage.clone(), limits.clone()),
    ));
    let validator = Arc::new(JwtValidator::new(&test_auth_config()));
    let router = report_routes::routes(service, validator, &limits);

    ReportTestContext {
        server: TestServer::new(router).expect("failed to start test server"),
        repository,
        storage,
        limits,
    }
}

pub fn testimonial_test_server() -> TestServer {
    let service = Arc::new(TestimonialService::new(Arc::new(
        InMemoryTestimonialRepository::default(),
    )));
    let validator = Arc::new(JwtValidator::new(&test_auth_config()));
    let router = testimonial_routes::public_routes(Arc::clone(&service))
        .merge(testimonial_routes::moderation_routes(service, validator));

    TestServer::new(router).expect("failed to start test server")
}

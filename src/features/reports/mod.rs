pub mod dtos;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;
pub mod routes;
pub mod services;

pub use repository::PgReportRepository;
pub use services::{AttachmentService, ReportService};

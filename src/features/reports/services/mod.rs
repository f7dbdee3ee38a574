mod attachment_service;
pub mod reference_number;
mod report_service;

pub use attachment_service::AttachmentService;
pub(crate) use attachment_service::{file_too_large, too_many_files};
pub use report_service::ReportService;

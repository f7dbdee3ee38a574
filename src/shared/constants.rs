// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Officer role - can list every report and delete any report
pub const ROLE_OFFICER: &str = "officer";

/// Admin role - holds every officer capability
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Maximum number of files accepted with one report
pub const DEFAULT_MAX_FILES_PER_REPORT: usize = 5;

/// Maximum size of a single attachment in bytes (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Folder under the public prefix holding report attachments
pub const REPORT_ATTACHMENT_FOLDER: &str = "reports";

// =============================================================================
// MESSAGES & TESTIMONIALS
// =============================================================================

pub const MAX_MESSAGE_LENGTH: u64 = 5000;

pub const MAX_SENDER_LENGTH: u64 = 100;

pub const MAX_TESTIMONIAL_LENGTH: u64 = 2000;

/// Number of approved testimonials shown publicly
pub const PUBLIC_TESTIMONIAL_LIMIT: i64 = 10;

pub const DEFAULT_TESTIMONIAL_AUTHOR: &str = "Anonymous";

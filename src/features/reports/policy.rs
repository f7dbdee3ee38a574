//! Access rules for report-scoped operations.
//!
//! Authentication itself happens in the middleware; these functions decide
//! what an already-resolved caller may do with a given report.

use crate::core::error::{AppError, Result};
use crate::features::auth::AuthenticatedUser;
use crate::features::reports::models::Report;

/// Owner recorded for a new report.
///
/// Anonymous submissions are never owned, even when the caller is
/// authenticated.
pub fn resolve_owner(is_anonymous: bool, caller: Option<&AuthenticatedUser>) -> Option<String> {
    if is_anonymous {
        return None;
    }
    caller.map(|user| user.user_id.clone())
}

/// The owner may delete their own report; officers may delete any report.
/// Unowned reports cannot be deleted by ordinary users since ownership
/// cannot be proven.
pub fn authorize_delete(report: &Report, caller: &AuthenticatedUser) -> Result<()> {
    if caller.is_officer() {
        return Ok(());
    }

    match report.user_id.as_deref() {
        Some(owner) if owner == caller.user_id => Ok(()),
        Some(_) => Err(AppError::Forbidden(
            "Not authorized to delete this report".to_string(),
        )),
        None => Err(AppError::Forbidden(
            "Anonymous reports can only be deleted by an officer".to_string(),
        )),
    }
}

/// Listing every report is an officer capability
pub fn authorize_list_all(caller: &AuthenticatedUser) -> Result<()> {
    if caller.is_officer() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Officer access required".to_string()))
    }
}

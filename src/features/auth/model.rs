use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_OFFICER};

/// Identity resolved from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Officer-level access: bulk listing, privileged deletion, moderation.
    /// Admins hold every officer capability.
    pub fn is_officer(&self) -> bool {
        self.has_role(ROLE_OFFICER) || self.has_role(ROLE_ADMIN)
    }
}

/// Token payload. `userId` is the primary identity claim; `sub` is accepted
/// for tokens minted by standard OIDC issuers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: u64,
}

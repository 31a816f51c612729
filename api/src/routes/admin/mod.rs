//! Administrative key management handlers
//!
//! Access requires an authenticated subject listed in `ADMIN_SUBJECTS`.

pub mod public_key;
pub mod rotate_keys;
pub mod rotation_info;

use tk_core::errors::{DomainError, DomainResult};

use crate::app::AppState;
use crate::middleware::AuthContext;

/// Rejects callers that are not configured administrators
pub(crate) fn require_admin(state: &AppState, auth: &AuthContext) -> DomainResult<()> {
    if state.auth.admin.is_admin(&auth.subject) {
        Ok(())
    } else {
        Err(DomainError::Forbidden {
            subject: auth.subject.clone(),
        })
    }
}

//! Role-based permission policy.
//!
//! Every role-gated route calls [`require`] with the action it performs;
//! the single table in [`allows`] is the only place a role is compared to
//! anything.

use crate::api::auth::AuthUser;
use crate::api::error::ApiError;
use crate::db::Role;

/// Role-gated actions across the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create/update/delete the caller's own mess, its menu, its notices,
    /// and review its enrollment requests and attendance
    ManageMess,
    /// Approve or reject messes and inspect the full registry
    ReviewMesses,
    /// Request enrollment, mark attendance, read student-facing views
    AttendMess,
}

/// The (role, action) permission table.
pub fn allows(role: Role, action: Action) -> bool {
    matches!(
        (role, action),
        (Role::MessAdmin, Action::ManageMess)
            | (Role::SuperAdmin, Action::ReviewMesses)
            | (Role::Student, Action::AttendMess)
    )
}

/// Gate a handler on the policy table; a mismatch is a 403.
pub fn require(user: &AuthUser, action: Action) -> Result<(), ApiError> {
    if allows(user.role, action) {
        return Ok(());
    }

    let message = match action {
        Action::ManageMess => "Only mess admins can perform this action.",
        Action::ReviewMesses => "Only super admin can perform this action.",
        Action::AttendMess => "Only students can perform this action.",
    };
    Err(ApiError::forbidden(message))
}

//! Enrollment rows: the join-request state machine between students and
//! messes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Enrollment request status. The absence of any row is the implicit
/// `not_joined` state reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown enrollment status: {}", s)),
        }
    }
}

impl From<String> for EnrollmentStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Self::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub mess_id: String,
    pub status: String,
    pub is_current: bool,
    pub created_at: String,
}

impl Enrollment {
    pub fn status_enum(&self) -> EnrollmentStatus {
        EnrollmentStatus::from(self.status.clone())
    }
}

/// Pending request as shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingRequestRow {
    pub id: String,
    pub student_name: String,
    pub email: String,
    pub mess_name: String,
}

/// Approved, current student as shown on the admin roster.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrolledStudentRow {
    pub enrollment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub email: String,
    pub mess_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CurrentEnrollmentRow {
    pub status: String,
    pub mess_id: String,
    pub mess_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrollmentHistoryRow {
    pub mess_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub mess_id: Option<String>,
}

/// Body of the admin approve/reject endpoints.
#[derive(Debug, Deserialize)]
pub struct EnrollmentActionRequest {
    pub enrollment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PendingRequestsResponse {
    pub success: bool,
    pub requests: Vec<PendingRequestRow>,
}

#[derive(Debug, Serialize)]
pub struct EnrolledStudentsResponse {
    pub success: bool,
    pub students: Vec<EnrolledStudentRow>,
    pub total: usize,
}

/// Status endpoint payload; the mess fields are omitted for `not_joined`.
#[derive(Debug, Serialize)]
pub struct EnrollmentStatusResponse {
    pub success: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mess_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mess_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentHistoryResponse {
    pub success: bool,
    pub enrollments: Vec<EnrollmentHistoryRow>,
}

//! Enrollment ledger: join requests and their approval state per
//! (student, mess) pair.
//!
//! A pair has at most one live row (`pending` or `approved`) at a time;
//! the partial unique index guarantees it. `rejected` rows stay
//! behind as history and never block a fresh request.

use axum::{
    extract::{Path, State},
    Json,
};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::info;

use crate::db::{
    CurrentEnrollmentRow, DbPool, EnrolledStudentRow, EnrolledStudentsResponse,
    EnrollmentActionRequest, EnrollmentHistoryResponse, EnrollmentHistoryRow,
    EnrollmentStatusResponse, JoinRequest, Mess, MessStatus, PendingRequestRow,
    PendingRequestsResponse,
};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{is_unique_violation, ApiError, MessageResponse};
use super::policy::{self, Action};

/// Enrollment joined with the admin of its mess, for ownership checks.
#[derive(Debug, FromRow)]
struct ManagedEnrollment {
    id: String,
    student_id: String,
    mess_id: String,
    admin_id: String,
}

/// Load an enrollment and check it belongs to the caller's mess.
async fn require_managed_enrollment(
    pool: &DbPool,
    enrollment_id: &str,
    admin_id: &str,
) -> Result<ManagedEnrollment, ApiError> {
    let row: Option<ManagedEnrollment> = sqlx::query_as(
        r#"
        SELECT e.id, e.student_id, e.mess_id, m.admin_id
        FROM student_mess_enrollments e
        JOIN messes m ON e.mess_id = m.id
        WHERE e.id = ?
        "#,
    )
    .bind(enrollment_id)
    .fetch_optional(pool)
    .await?;
    let row = row.ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if row.admin_id != admin_id {
        return Err(ApiError::forbidden("You do not manage this enrollment."));
    }

    Ok(row)
}

/// POST /enrollment/request
pub async fn request_join(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<JoinRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::AttendMess)?;

    let mess_id = req.mess_id.as_deref().unwrap_or("");
    if mess_id.is_empty() {
        return Err(ApiError::bad_request("mess_id is required."));
    }

    let mess: Option<Mess> = sqlx::query_as("SELECT * FROM messes WHERE id = ?")
        .bind(mess_id)
        .fetch_optional(&state.db)
        .await?;
    let mess = mess.ok_or_else(|| ApiError::not_found("Mess not found."))?;
    if mess.status_enum() != MessStatus::Approved {
        return Err(ApiError::bad_request("Mess is not open for enrollment."));
    }

    let existing: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT id FROM student_mess_enrollments
        WHERE student_id = ? AND mess_id = ?
          AND status IN ('pending', 'approved')
        "#,
    )
    .bind(&auth.id)
    .bind(mess_id)
    .fetch_optional(&state.db)
    .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Already requested or already approved."));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let result = sqlx::query(
        r#"
        INSERT INTO student_mess_enrollments (id, student_id, mess_id, status, is_current)
        VALUES (?, ?, ?, 'pending', 0)
        "#,
    )
    .bind(&id)
    .bind(&auth.id)
    .bind(mess_id)
    .execute(&state.db)
    .await;

    match result {
        Ok(_) => {
            info!(student = %auth.id, mess = %mess_id, "Join request created");
            Ok(MessageResponse::ok("Join request sent successfully."))
        }
        // The partial unique index catches two concurrent requests
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::conflict("Already requested or already approved."))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /enrollment/pending
pub async fn pending_requests(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<PendingRequestsResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let requests: Vec<PendingRequestRow> = sqlx::query_as(
        r#"
        SELECT
            e.id,
            u.name AS student_name,
            u.email,
            m.name AS mess_name
        FROM student_mess_enrollments e
        JOIN users u ON e.student_id = u.id
        JOIN messes m ON e.mess_id = m.id
        WHERE m.admin_id = ?
          AND e.status = 'pending'
          AND u.role = 'student'
        "#,
    )
    .bind(&auth.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(PendingRequestsResponse {
        success: true,
        requests,
    }))
}

/// POST /enrollment/approve
pub async fn approve_request(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<EnrollmentActionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let enrollment_id = req.enrollment_id.as_deref().unwrap_or("");
    if enrollment_id.is_empty() {
        return Err(ApiError::bad_request("enrollment_id is required."));
    }

    require_managed_enrollment(&state.db, enrollment_id, &auth.id).await?;

    sqlx::query(
        "UPDATE student_mess_enrollments SET status = 'approved', is_current = 1 WHERE id = ?",
    )
    .bind(enrollment_id)
    .execute(&state.db)
    .await?;

    Ok(MessageResponse::ok("Request approved successfully."))
}

/// POST /enrollment/reject
pub async fn reject_request(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<EnrollmentActionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let enrollment_id = req.enrollment_id.as_deref().unwrap_or("");
    if enrollment_id.is_empty() {
        return Err(ApiError::bad_request("enrollment_id is required."));
    }

    require_managed_enrollment(&state.db, enrollment_id, &auth.id).await?;

    // is_current stays untouched on rejection
    sqlx::query("UPDATE student_mess_enrollments SET status = 'rejected' WHERE id = ?")
        .bind(enrollment_id)
        .execute(&state.db)
        .await?;

    Ok(MessageResponse::ok("Request rejected successfully."))
}

/// DELETE /enrollment/remove/:id
///
/// Drops the enrollment and that student's attendance for the mess in one
/// transaction.
pub async fn remove_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let enrollment = require_managed_enrollment(&state.db, &id, &auth.id).await?;

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM attendance WHERE student_id = ? AND mess_id = ?")
        .bind(&enrollment.student_id)
        .bind(&enrollment.mess_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM student_mess_enrollments WHERE id = ?")
        .bind(&enrollment.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(enrollment = %id, "Student removed from mess");
    Ok(MessageResponse::ok("Student removed successfully"))
}

/// GET /enrollment/status
pub async fn enrollment_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<EnrollmentStatusResponse>, ApiError> {
    policy::require(&auth, Action::AttendMess)?;

    let row: Option<CurrentEnrollmentRow> = sqlx::query_as(
        r#"
        SELECT e.status, e.mess_id, m.name AS mess_name
        FROM student_mess_enrollments e
        JOIN messes m ON e.mess_id = m.id
        WHERE e.student_id = ?
          AND e.is_current = 1
        LIMIT 1
        "#,
    )
    .bind(&auth.id)
    .fetch_optional(&state.db)
    .await?;

    let response = match row {
        Some(row) => EnrollmentStatusResponse {
            success: true,
            status: row.status,
            mess_id: Some(row.mess_id),
            mess_name: Some(row.mess_name),
        },
        None => EnrollmentStatusResponse {
            success: true,
            status: "not_joined".to_string(),
            mess_id: None,
            mess_name: None,
        },
    };

    Ok(Json(response))
}

/// GET /enrollment/my, the full request history with rejections included
pub async fn my_enrollments(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<EnrollmentHistoryResponse>, ApiError> {
    policy::require(&auth, Action::AttendMess)?;

    let enrollments: Vec<EnrollmentHistoryRow> = sqlx::query_as(
        "SELECT mess_id, status FROM student_mess_enrollments WHERE student_id = ?",
    )
    .bind(&auth.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(EnrollmentHistoryResponse {
        success: true,
        enrollments,
    }))
}

/// GET /enrollment/enrolled
pub async fn enrolled_students(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<EnrolledStudentsResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let students: Vec<EnrolledStudentRow> = sqlx::query_as(
        r#"
        SELECT
            e.id AS enrollment_id,
            u.id AS student_id,
            u.name AS student_name,
            u.email,
            m.name AS mess_name
        FROM student_mess_enrollments e
        JOIN users u ON e.student_id = u.id
        JOIN messes m ON e.mess_id = m.id
        WHERE m.admin_id = ?
          AND e.status = 'approved'
          AND e.is_current = 1
        ORDER BY m.name, u.name
        "#,
    )
    .bind(&auth.id)
    .fetch_all(&state.db)
    .await?;

    let total = students.len();
    Ok(Json(EnrolledStudentsResponse {
        success: true,
        students,
        total,
    }))
}

//! Attendance log: one `present` row per student per mess per calendar day.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::{
    AttendanceCountResponse, AttendanceCountRow, AttendanceDetailRow, AttendanceDetailsResponse,
    AttendanceHistoryResponse, AttendanceHistoryRow, MarkAttendanceRequest,
};
use crate::utils::today_stamp;
use crate::AppState;

use super::auth::AuthUser;
use super::error::{is_unique_violation, ApiError, MessageResponse};
use super::policy::{self, Action};

/// POST /attendance/mark
///
/// Requires a live (approved, current) enrollment in the mess. The UNIQUE
/// constraint on (student, mess, date) turns a repeat mark into the
/// "already marked" answer.
pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::AttendMess)?;

    let mess_id = req.mess_id.as_deref().unwrap_or("");
    if mess_id.is_empty() {
        return Err(ApiError::bad_request("mess_id is required."));
    }

    let enrolled: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT id FROM student_mess_enrollments
        WHERE student_id = ? AND mess_id = ?
          AND status = 'approved' AND is_current = 1
        "#,
    )
    .bind(&auth.id)
    .bind(mess_id)
    .fetch_optional(&state.db)
    .await?;
    if enrolled.is_none() {
        return Err(ApiError::forbidden("You are not enrolled in this mess."));
    }

    let today = today_stamp();
    let id = uuid::Uuid::new_v4().to_string();
    let result = sqlx::query(
        "INSERT INTO attendance (id, student_id, mess_id, date, status) VALUES (?, ?, ?, ?, 'present')",
    )
    .bind(&id)
    .bind(&auth.id)
    .bind(mess_id)
    .bind(&today)
    .execute(&state.db)
    .await;

    match result {
        Ok(_) => Ok(MessageResponse::ok("Attendance marked successfully.")),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::conflict("Attendance already marked today."))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /attendance/today, per-mess present counts for the admin
pub async fn today_count(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AttendanceCountResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    // LEFT JOIN so a mess with nobody present still reports 0
    let attendance: Vec<AttendanceCountRow> = sqlx::query_as(
        r#"
        SELECT
            m.name AS mess_name,
            COUNT(a.id) AS present_students
        FROM messes m
        LEFT JOIN attendance a
            ON m.id = a.mess_id AND a.date = ?
        WHERE m.admin_id = ?
        GROUP BY m.id
        "#,
    )
    .bind(today_stamp())
    .bind(&auth.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(AttendanceCountResponse {
        success: true,
        attendance,
    }))
}

/// GET /attendance/today/details, the full roster of students present today
pub async fn today_details(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AttendanceDetailsResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let students: Vec<AttendanceDetailRow> = sqlx::query_as(
        r#"
        SELECT
            a.id AS attendance_id,
            u.id AS student_id,
            u.name AS student_name,
            u.email,
            m.name AS mess_name,
            a.date
        FROM attendance a
        JOIN users u ON a.student_id = u.id
        JOIN messes m ON a.mess_id = m.id
        WHERE m.admin_id = ? AND a.date = ?
        ORDER BY u.name ASC
        "#,
    )
    .bind(&auth.id)
    .bind(today_stamp())
    .fetch_all(&state.db)
    .await?;

    let count = students.len();
    Ok(Json(AttendanceDetailsResponse {
        success: true,
        students,
        count,
    }))
}

/// GET /attendance/history, the student's own marks, newest first
pub async fn history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AttendanceHistoryResponse>, ApiError> {
    policy::require(&auth, Action::AttendMess)?;

    let history: Vec<AttendanceHistoryRow> = sqlx::query_as(
        r#"
        SELECT date, status, mess_id
        FROM attendance
        WHERE student_id = ?
        ORDER BY date DESC
        "#,
    )
    .bind(&auth.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(AttendanceHistoryResponse {
        success: true,
        history,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil;
    use axum::http::StatusCode;

    async fn mark(state: &Arc<AppState>, student: &AuthUser, mess_id: &str) -> Result<(), ApiError> {
        mark_attendance(
            State(state.clone()),
            student.clone(),
            Json(MarkAttendanceRequest {
                mess_id: Some(mess_id.to_string()),
            }),
        )
        .await
        .map(|_| ())
    }

    #[tokio::test]
    async fn test_second_mark_same_day_rejected() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;
        let student = testutil::register_user(&state, "student", "s@hostel.edu").await;
        let mess_id = testutil::create_approved_mess(&state, &admin, "Sunrise Mess").await;
        testutil::enroll_approved(&state, &student, &mess_id).await;

        mark(&state, &student, &mess_id).await.unwrap();

        let err = mark(&state, &student, &mess_id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Attendance already marked today.");

        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM attendance WHERE student_id = ? AND mess_id = ?")
                .bind(&student.id)
                .bind(&mess_id)
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_mark_requires_live_enrollment() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;
        let student = testutil::register_user(&state, "student", "s@hostel.edu").await;
        let mess_id = testutil::create_approved_mess(&state, &admin, "Sunrise Mess").await;

        // No enrollment at all
        let err = mark(&state, &student, &mess_id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        // A pending request is not enough
        sqlx::query(
            "INSERT INTO student_mess_enrollments (id, student_id, mess_id, status, is_current) VALUES (?, ?, ?, 'pending', 0)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&student.id)
        .bind(&mess_id)
        .execute(&state.db)
        .await
        .unwrap();

        let err = mark(&state, &student, &mess_id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_today_count_includes_empty_mess() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;
        let mess_id = testutil::create_approved_mess(&state, &admin, "Sunrise Mess").await;

        let resp = today_count(State(state.clone()), admin.clone()).await.unwrap();
        assert_eq!(resp.0.attendance.len(), 1);
        assert_eq!(resp.0.attendance[0].present_students, 0);

        let student = testutil::register_user(&state, "student", "s@hostel.edu").await;
        testutil::enroll_approved(&state, &student, &mess_id).await;
        mark(&state, &student, &mess_id).await.unwrap();

        let resp = today_count(State(state.clone()), admin.clone()).await.unwrap();
        assert_eq!(resp.0.attendance[0].present_students, 1);

        let resp = today_details(State(state.clone()), admin).await.unwrap();
        assert_eq!(resp.0.count, 1);
        assert_eq!(resp.0.students[0].email, "s@hostel.edu");
        assert_eq!(resp.0.students[0].date, crate::utils::today_stamp());
    }

    #[tokio::test]
    async fn test_history_newest_first_with_mess_id() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;
        let student = testutil::register_user(&state, "student", "s@hostel.edu").await;
        let mess_id = testutil::create_approved_mess(&state, &admin, "Sunrise Mess").await;
        testutil::enroll_approved(&state, &student, &mess_id).await;

        for date in ["2026-08-01", "2026-08-03", "2026-08-02"] {
            sqlx::query(
                "INSERT INTO attendance (id, student_id, mess_id, date) VALUES (?, ?, ?, ?)",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&student.id)
            .bind(&mess_id)
            .bind(date)
            .execute(&state.db)
            .await
            .unwrap();
        }

        let resp = history(State(state.clone()), student).await.unwrap();
        let dates: Vec<&str> = resp.0.history.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-08-03", "2026-08-02", "2026-08-01"]);
        assert!(resp.0.history.iter().all(|r| r.mess_id == mess_id));
        assert!(resp.0.history.iter().all(|r| r.status == "present"));
    }
}

//! Attendance rows: one `present` row per student per mess per day.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub id: String,
    pub student_id: String,
    pub mess_id: String,
    pub date: String,
    pub status: String,
}

/// Per-mess present count for the admin summary.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceCountRow {
    pub mess_name: String,
    pub present_students: i64,
}

/// One present student on the admin's detailed list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceDetailRow {
    pub attendance_id: String,
    pub student_id: String,
    pub student_name: String,
    pub email: String,
    pub mess_name: String,
    pub date: String,
}

/// One row of a student's own history, with mess_id for client-side
/// filtering.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceHistoryRow {
    pub date: String,
    pub status: String,
    pub mess_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub mess_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceCountResponse {
    pub success: bool,
    pub attendance: Vec<AttendanceCountRow>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceDetailsResponse {
    pub success: bool,
    pub students: Vec<AttendanceDetailRow>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AttendanceHistoryResponse {
    pub success: bool,
    pub history: Vec<AttendanceHistoryRow>,
}

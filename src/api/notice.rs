//! Notice board: admin-authored messages scoped to a mess.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::{CreateNoticeRequest, NoticeListResponse, NoticeWithMess};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, MessageResponse};
use super::mess::find_by_admin;
use super::policy::{self, Action};
use super::validation::validate_name;

/// POST /notice/create
pub async fn create_notice(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<CreateNoticeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let title = req.title.as_deref().unwrap_or("").trim();
    let message = req.message.as_deref().unwrap_or("").trim();

    if title.is_empty() || message.is_empty() {
        return Err(ApiError::bad_request("Title and message are required."));
    }
    validate_name(title, "Title").map_err(ApiError::bad_request)?;

    let mess = find_by_admin(&state.db, &auth.id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Create a mess first."))?;

    sqlx::query("INSERT INTO notices (id, mess_id, title, message) VALUES (?, ?, ?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&mess.id)
        .bind(title)
        .bind(message)
        .execute(&state.db)
        .await?;

    Ok(MessageResponse::ok("Notice added successfully."))
}

/// GET /notice/my, the admin's own notices newest first
pub async fn list_my_notices(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<NoticeListResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let mess = match find_by_admin(&state.db, &auth.id).await? {
        Some(mess) => mess,
        None => {
            return Ok(Json(NoticeListResponse {
                success: true,
                notices: vec![],
            }))
        }
    };

    let notices: Vec<NoticeWithMess> = sqlx::query_as(
        r#"
        SELECT
            n.id,
            n.title,
            n.message,
            n.created_at,
            m.id AS mess_id,
            m.name AS mess_name
        FROM notices n
        JOIN messes m ON n.mess_id = m.id
        WHERE n.mess_id = ?
        ORDER BY n.created_at DESC
        "#,
    )
    .bind(&mess.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(NoticeListResponse {
        success: true,
        notices,
    }))
}

/// DELETE /notice/delete/:id
pub async fn delete_notice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let owner: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT m.admin_id
        FROM notices n
        JOIN messes m ON n.mess_id = m.id
        WHERE n.id = ?
        "#,
    )
    .bind(&id)
    .fetch_optional(&state.db)
    .await?;
    let owner = owner.ok_or_else(|| ApiError::not_found("Notice not found."))?;

    if owner.0 != auth.id {
        return Err(ApiError::forbidden(
            "You do not manage the mess this notice belongs to.",
        ));
    }

    sqlx::query("DELETE FROM notices WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    Ok(MessageResponse::ok("Notice removed successfully."))
}

/// GET /notice/student, notices of the student's current messes,
/// newest first
pub async fn list_student_notices(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<NoticeListResponse>, ApiError> {
    policy::require(&auth, Action::AttendMess)?;

    let notices: Vec<NoticeWithMess> = sqlx::query_as(
        r#"
        SELECT
            n.id,
            n.title,
            n.message,
            n.created_at,
            m.id AS mess_id,
            m.name AS mess_name
        FROM notices n
        JOIN messes m ON n.mess_id = m.id
        JOIN student_mess_enrollments e ON e.mess_id = m.id
        WHERE e.student_id = ?
          AND e.status = 'approved'
          AND e.is_current = 1
        ORDER BY n.created_at DESC
        "#,
    )
    .bind(&auth.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(NoticeListResponse {
        success: true,
        notices,
    }))
}

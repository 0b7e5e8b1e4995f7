//! Mess registry: admin-side CRUD plus the super-admin approval workflow.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::db::{
    CreateMessRequest, DbPool, Mess, MessActionRequest, MessAdminListResponse, MessListResponse,
    MessStatus, MessSummary, MessWithAdmin, MyMessResponse, UpdateMessRequest,
};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{is_unique_violation, ApiError, MessageResponse};
use super::policy::{self, Action};
use super::validation::validate_name;

/// An admin's mess, if they have created one.
pub(crate) async fn find_by_admin(
    pool: &DbPool,
    admin_id: &str,
) -> Result<Option<Mess>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM messes WHERE admin_id = ?")
        .bind(admin_id)
        .fetch_optional(pool)
        .await
}

/// Load a mess and check the caller owns it. 404 when absent, 403 when
/// owned by someone else.
async fn require_owned_mess(pool: &DbPool, mess_id: &str, admin_id: &str) -> Result<Mess, ApiError> {
    let mess: Option<Mess> = sqlx::query_as("SELECT * FROM messes WHERE id = ?")
        .bind(mess_id)
        .fetch_optional(pool)
        .await?;
    let mess = mess.ok_or_else(|| ApiError::not_found("Mess not found."))?;

    if mess.admin_id != admin_id {
        return Err(ApiError::forbidden("You do not manage this mess."));
    }

    Ok(mess)
}

/// POST /mess/create
pub async fn create_mess(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<CreateMessRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let name = req.name.as_deref().unwrap_or("").trim();
    let location = req.location.as_deref().unwrap_or("").trim();

    if name.is_empty() || location.is_empty() {
        return Err(ApiError::bad_request("Name and location are required."));
    }
    validate_name(name, "Name").map_err(ApiError::bad_request)?;
    validate_name(location, "Location").map_err(ApiError::bad_request)?;

    // One mess per admin; the UNIQUE on admin_id is the backstop
    if find_by_admin(&state.db, &auth.id).await?.is_some() {
        return Err(ApiError::bad_request("You already created a mess."));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let result = sqlx::query(
        "INSERT INTO messes (id, name, description, location, admin_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(&req.description)
    .bind(location)
    .bind(&auth.id)
    .execute(&state.db)
    .await;

    match result {
        Ok(_) => {
            info!(mess = %id, admin = %auth.id, "Mess created, pending approval");
            Ok(MessageResponse::ok(
                "Mess created successfully. It is now pending approval by the super admin.",
            ))
        }
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::bad_request("You already created a mess."))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /mess/my
pub async fn get_my_mess(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MyMessResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let mess = find_by_admin(&state.db, &auth.id).await?;
    Ok(Json(MyMessResponse {
        success: true,
        mess,
    }))
}

/// PUT /mess/update/:id
pub async fn update_mess(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    auth: AuthUser,
    Json(req): Json<UpdateMessRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let name = req.name.as_deref().unwrap_or("").trim();
    let location = req.location.as_deref().unwrap_or("").trim();
    if name.is_empty() || location.is_empty() {
        return Err(ApiError::bad_request("Name and location are required."));
    }

    require_owned_mess(&state.db, &id, &auth.id).await?;

    sqlx::query("UPDATE messes SET name = ?, description = ?, location = ? WHERE id = ?")
        .bind(name)
        .bind(&req.description)
        .bind(location)
        .bind(&id)
        .execute(&state.db)
        .await?;

    Ok(MessageResponse::ok("Mess updated successfully"))
}

/// DELETE /mess/delete/:id
///
/// Removes the mess together with everything scoped to it.
pub async fn delete_mess(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    require_owned_mess(&state.db, &id, &auth.id).await?;

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM attendance WHERE mess_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM student_mess_enrollments WHERE mess_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM mess_menus WHERE mess_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM notices WHERE mess_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM messes WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(mess = %id, "Mess deleted");
    Ok(MessageResponse::ok("Mess deleted successfully."))
}

/// GET /mess/all (public), approved messes only
pub async fn list_approved(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessListResponse>, ApiError> {
    let messes: Vec<MessSummary> = sqlx::query_as(
        "SELECT id, name, description, location FROM messes WHERE status = 'approved'",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(MessListResponse {
        success: true,
        messes,
    }))
}

const WITH_ADMIN_COLUMNS: &str = r#"
    SELECT
        m.id, m.name, m.description, m.location, m.status, m.created_at,
        u.id AS admin_id,
        u.name AS admin_name,
        u.email AS admin_email,
        u.phone AS admin_phone,
        u.address AS admin_address,
        u.gst_number AS admin_gst_number
    FROM messes m
    JOIN users u ON m.admin_id = u.id
"#;

/// GET /mess/pending, the super admin review queue
pub async fn pending_messes(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MessAdminListResponse>, ApiError> {
    policy::require(&auth, Action::ReviewMesses)?;

    let sql = format!(
        "{WITH_ADMIN_COLUMNS} WHERE m.status = 'pending' ORDER BY m.created_at DESC"
    );
    let messes: Vec<MessWithAdmin> = sqlx::query_as(&sql).fetch_all(&state.db).await?;

    Ok(Json(MessAdminListResponse {
        success: true,
        messes,
    }))
}

/// GET /mess/all-admin, the super admin view of every mess in any status
pub async fn all_messes_admin(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MessAdminListResponse>, ApiError> {
    policy::require(&auth, Action::ReviewMesses)?;

    let sql = format!("{WITH_ADMIN_COLUMNS} ORDER BY m.created_at DESC");
    let messes: Vec<MessWithAdmin> = sqlx::query_as(&sql).fetch_all(&state.db).await?;

    Ok(Json(MessAdminListResponse {
        success: true,
        messes,
    }))
}

async fn set_status(
    state: &AppState,
    auth: &AuthUser,
    req: &MessActionRequest,
    status: MessStatus,
) -> Result<(), ApiError> {
    policy::require(auth, Action::ReviewMesses)?;

    let mess_id = req.mess_id.as_deref().unwrap_or("");
    if mess_id.is_empty() {
        return Err(ApiError::bad_request("mess_id is required."));
    }

    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM messes WHERE id = ?")
        .bind(mess_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("Mess not found."));
    }

    sqlx::query("UPDATE messes SET status = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(mess_id)
        .execute(&state.db)
        .await?;

    info!(mess = %mess_id, status = %status, "Mess status updated");
    Ok(())
}

/// POST /mess/approve
pub async fn approve_mess(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<MessActionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    set_status(&state, &auth, &req, MessStatus::Approved).await?;
    Ok(MessageResponse::ok("Mess approved successfully."))
}

/// POST /mess/reject
pub async fn reject_mess(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<MessActionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    set_status(&state, &auth, &req, MessStatus::Rejected).await?;
    Ok(MessageResponse::ok("Mess rejected."))
}

//! Notice board rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notice {
    pub id: String,
    pub mess_id: String,
    pub title: String,
    pub message: String,
    pub created_at: String,
}

/// Notice joined with its mess, as rendered on both dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NoticeWithMess {
    pub id: String,
    pub title: String,
    pub message: String,
    pub created_at: String,
    pub mess_id: String,
    pub mess_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoticeRequest {
    pub title: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoticeListResponse {
    pub success: bool,
    pub notices: Vec<NoticeWithMess>,
}

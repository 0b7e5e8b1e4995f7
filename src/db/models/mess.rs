//! Mess entities and the approval-status lifecycle.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Approval status of a mess. New messes start `pending` and become visible
/// to students only once a super admin approves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for MessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for MessStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown mess status: {}", s)),
        }
    }
}

impl From<String> for MessStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Self::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mess {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub admin_id: String,
    pub status: String,
    pub created_at: String,
}

impl Mess {
    pub fn status_enum(&self) -> MessStatus {
        MessStatus::from(self.status.clone())
    }
}

/// Public listing row: what students see when browsing approved messes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
}

/// Super-admin view: mess joined with its admin's contact details.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessWithAdmin {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub status: String,
    pub created_at: String,
    pub admin_id: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_phone: String,
    pub admin_address: String,
    pub admin_gst_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// Body of the super-admin approve/reject endpoints.
#[derive(Debug, Deserialize)]
pub struct MessActionRequest {
    pub mess_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessListResponse {
    pub success: bool,
    pub messes: Vec<MessSummary>,
}

#[derive(Debug, Serialize)]
pub struct MyMessResponse {
    pub success: bool,
    pub mess: Option<Mess>,
}

#[derive(Debug, Serialize)]
pub struct MessAdminListResponse {
    pub success: bool,
    pub messes: Vec<MessWithAdmin>,
}

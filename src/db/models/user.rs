//! User account models and role definitions.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The three account roles.
///
/// `student` and `mess_admin` are self-service at registration;
/// `super_admin` accounts only exist through the startup seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    MessAdmin,
    SuperAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::MessAdmin => write!(f, "mess_admin"),
            Role::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "mess_admin" => Ok(Role::MessAdmin),
            "super_admin" => Ok(Role::SuperAdmin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Role::Student)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone: String,
    pub address: String,
    pub aadhar_number: Option<String>,
    pub gst_number: Option<String>,
    pub security_question: String,
    pub security_answer_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn role_enum(&self) -> Role {
        Role::from(self.role.clone())
    }
}

/// Public view of a user, as embedded in the login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            email: user.email,
        }
    }
}

/// Registration payload. Every field is optional at the serde layer so the
/// handler can answer missing fields with the API's own 400 message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub aadhar_number: Option<String>,
    pub gst_number: Option<String>,
    pub security_question: Option<String>,
    pub security_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityQuestionResponse {
    pub success: bool,
    pub security_question: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub security_answer: Option<String>,
    pub new_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Student, Role::MessAdmin, Role::SuperAdmin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_defaults_to_student() {
        assert_eq!(Role::from("warden".to_string()), Role::Student);
    }
}

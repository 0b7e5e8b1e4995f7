//! Shared fixtures for the API tests: an in-memory app state and shortcuts
//! for creating users, messes, and enrollments.

use axum::extract::{Json, State};
use std::sync::Arc;

use crate::config::Config;
use crate::db::{CreateMessRequest, Mess, RegisterRequest, User};
use crate::AppState;

use super::auth::{self, AuthUser};
use super::mess;

pub const PASSWORD: &str = "secret-pass-1";
pub const SECURITY_QUESTION: &str = "Name of your first pet?";
pub const SECURITY_ANSWER: &str = "rex";

pub async fn state() -> Arc<AppState> {
    let pool = crate::db::test_pool().await;
    let mut config = Config::default();
    config.auth.jwt_secret = "test-secret".to_string();
    Arc::new(AppState::new(config, pool))
}

pub fn register_request(role: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        name: Some("Test User".to_string()),
        email: Some(email.to_string()),
        password: Some(PASSWORD.to_string()),
        role: Some(role.to_string()),
        phone: Some("9876543210".to_string()),
        address: Some("Hostel Block A".to_string()),
        aadhar_number: (role == "student").then(|| "123412341234".to_string()),
        gst_number: (role == "mess_admin").then(|| "22AAAAA0000A1Z5".to_string()),
        security_question: Some(SECURITY_QUESTION.to_string()),
        security_answer: Some(SECURITY_ANSWER.to_string()),
    }
}

/// Register through the real handler and return the caller identity.
pub async fn register_user(state: &Arc<AppState>, role: &str, email: &str) -> AuthUser {
    auth::register(State(state.clone()), Json(register_request(role, email)))
        .await
        .expect("registration");

    let user: User = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(&state.db)
        .await
        .expect("registered user");

    AuthUser {
        role: user.role_enum(),
        id: user.id,
    }
}

/// The seeded super admin.
pub async fn super_admin(state: &Arc<AppState>) -> AuthUser {
    auth::ensure_super_admin(&state.db, "root@messhall.local", "root-pass-1")
        .await
        .expect("seed super admin");

    let user: User = sqlx::query_as("SELECT * FROM users WHERE email = 'root@messhall.local'")
        .fetch_one(&state.db)
        .await
        .unwrap();

    AuthUser {
        role: user.role_enum(),
        id: user.id,
    }
}

/// Create a mess through the handler; it starts out pending.
pub async fn create_mess(state: &Arc<AppState>, admin: &AuthUser, name: &str) -> String {
    mess::create_mess(
        State(state.clone()),
        admin.clone(),
        Json(CreateMessRequest {
            name: Some(name.to_string()),
            description: None,
            location: Some("Block C".to_string()),
        }),
    )
    .await
    .expect("create mess");

    let mess: Mess = sqlx::query_as("SELECT * FROM messes WHERE admin_id = ?")
        .bind(&admin.id)
        .fetch_one(&state.db)
        .await
        .unwrap();
    mess.id
}

/// Fixture shortcut: a mess that is already approved.
pub async fn create_approved_mess(state: &Arc<AppState>, admin: &AuthUser, name: &str) -> String {
    let mess_id = create_mess(state, admin, name).await;
    sqlx::query("UPDATE messes SET status = 'approved' WHERE id = ?")
        .bind(&mess_id)
        .execute(&state.db)
        .await
        .unwrap();
    mess_id
}

/// Fixture shortcut: an enrollment already approved and current.
pub async fn enroll_approved(state: &Arc<AppState>, student: &AuthUser, mess_id: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO student_mess_enrollments (id, student_id, mess_id, status, is_current) VALUES (?, ?, ?, 'approved', 1)",
    )
    .bind(&id)
    .bind(&student.id)
    .bind(mess_id)
    .execute(&state.db)
    .await
    .unwrap();
    id
}

//! Authentication: password hashing, bearer tokens, and the account flows
//! (register, login, password change and recovery).
//!
//! Tokens are HS256 JWTs carrying `{id, role}` and a 7-day expiry. The
//! decoded identity travels through handlers as an [`AuthUser`] extractor
//! value; nothing about the caller is held in ambient state.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::{
    ChangePasswordRequest, DbPool, ForgotPasswordRequest, LoginRequest, LoginResponse,
    RegisterRequest, ResetPasswordRequest, Role, SecurityQuestionResponse, User, UserResponse,
};
use crate::AppState;

use super::error::{is_unique_violation, ApiError, MessageResponse};
use super::validation::{
    validate_aadhar, validate_email, validate_gst, validate_password,
};

/// Token lifetime. Clients re-authenticate weekly.
const TOKEN_TTL_DAYS: i64 = 7;

/// Hash a password (or security answer) using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Bearer token claims: who the caller is and what they may act as.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub role: String,
    pub exp: i64,
}

/// Mint a signed token for a user.
pub fn issue_token(user_id: &str, role: &str, secret: &str) -> Result<String, ApiError> {
    let exp = Utc::now() + Duration::days(TOKEN_TTL_DAYS);
    let claims = Claims {
        id: user_id.to_string(),
        role: role.to_string(),
        exp: exp.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        ApiError::internal()
    })
}

/// Decode and validate a token, including its expiry.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// The authenticated caller, decoded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => &header[7..],
            _ => return Err(ApiError::unauthorized("No token provided.")),
        };

        let claims = decode_token(token, &state.config.auth.jwt_secret)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token."))?;

        Ok(AuthUser {
            id: claims.id,
            role: Role::from(claims.role),
        })
    }
}

pub(crate) async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Seed the configured super-admin account if it does not exist yet.
///
/// The seeded account gets a random, unrecoverable security answer; password
/// recovery for it goes through configuration, not the question flow.
pub async fn ensure_super_admin(pool: &DbPool, email: &str, password: &str) -> anyhow::Result<()> {
    if find_by_email(pool, email).await?.is_some() {
        return Ok(());
    }

    let id = uuid::Uuid::new_v4().to_string();
    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    let answer_hash = hash_password(&uuid::Uuid::new_v4().to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash answer: {}", e))?;

    sqlx::query(
        r#"
        INSERT INTO users
            (id, name, email, password_hash, role, phone, address,
             security_question, security_answer_hash)
        VALUES (?, ?, ?, ?, 'super_admin', '-', '-', '-', ?)
        "#,
    )
    .bind(&id)
    .bind("Super Admin")
    .bind(email)
    .bind(&password_hash)
    .bind(&answer_hash)
    .execute(pool)
    .await?;

    tracing::info!("Seeded super admin account: {}", email);
    Ok(())
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = req.name.as_deref().unwrap_or("").trim();
    let email = req.email.as_deref().unwrap_or("").trim();
    let password = req.password.as_deref().unwrap_or("");
    let phone = req.phone.as_deref().unwrap_or("").trim();
    let address = req.address.as_deref().unwrap_or("").trim();
    let security_question = req.security_question.as_deref().unwrap_or("").trim();
    let security_answer = req.security_answer.as_deref().unwrap_or("");

    if name.is_empty()
        || email.is_empty()
        || password.is_empty()
        || phone.is_empty()
        || address.is_empty()
        || security_question.is_empty()
        || security_answer.is_empty()
    {
        return Err(ApiError::bad_request("Please fill all required fields."));
    }

    // Only student and mess_admin are self-service; anything else is a student
    let role = match req.role.as_deref() {
        Some("mess_admin") => Role::MessAdmin,
        _ => Role::Student,
    };

    let aadhar = req.aadhar_number.as_deref().unwrap_or("").trim().to_string();
    let gst = req.gst_number.as_deref().unwrap_or("").trim().to_string();

    if role == Role::Student && aadhar.is_empty() {
        return Err(ApiError::bad_request(
            "Aadhar number is required for students.",
        ));
    }
    if role == Role::MessAdmin && gst.is_empty() {
        return Err(ApiError::bad_request(
            "GST number is required for mess admins.",
        ));
    }

    validate_email(email).map_err(ApiError::bad_request)?;
    validate_password(password).map_err(ApiError::bad_request)?;
    if role == Role::Student {
        validate_aadhar(&aadhar).map_err(ApiError::bad_request)?;
    }
    if role == Role::MessAdmin {
        validate_gst(&gst).map_err(ApiError::bad_request)?;
    }

    if find_by_email(&state.db, email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered."));
    }

    let password_hash = hash_password(password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal()
    })?;
    let answer_hash = hash_password(security_answer).map_err(|e| {
        tracing::error!("Failed to hash security answer: {}", e);
        ApiError::internal()
    })?;

    let aadhar_value = (role == Role::Student).then_some(aadhar);
    let gst_value = (role == Role::MessAdmin).then_some(gst);

    let id = uuid::Uuid::new_v4().to_string();
    let result = sqlx::query(
        r#"
        INSERT INTO users
            (id, name, email, password_hash, role, phone, address,
             aadhar_number, gst_number, security_question, security_answer_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .bind(role.to_string())
    .bind(phone)
    .bind(address)
    .bind(&aadhar_value)
    .bind(&gst_value)
    .bind(security_question)
    .bind(&answer_hash)
    .execute(&state.db)
    .await;

    match result {
        Ok(_) => Ok(MessageResponse::ok("User registered successfully.")),
        // The UNIQUE index is the backstop for concurrent registrations
        Err(e) if is_unique_violation(&e) => Err(ApiError::conflict("Email already registered.")),
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = req.email.as_deref().unwrap_or("").trim();
    let password = req.password.as_deref().unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required."));
    }

    let user = find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid email or password."))?;

    if !verify_password(password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password."));
    }

    let token = issue_token(&user.id, &user.role, &state.config.auth.jwt_secret)?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from(user),
    }))
}

/// POST /auth/logout
///
/// Tokens are client-held, so there is nothing to revoke server-side.
pub async fn logout() -> Json<MessageResponse> {
    MessageResponse::ok("Logged out successfully.")
}

/// PUT /auth/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let current = req.current_password.as_deref().unwrap_or("");
    let new_password = req.new_password.as_deref().unwrap_or("");

    if current.is_empty() || new_password.is_empty() {
        return Err(ApiError::bad_request(
            "Current password and new password are required.",
        ));
    }

    validate_password(new_password).map_err(ApiError::bad_request)?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&auth.id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(|| ApiError::not_found("User not found."))?;

    if !verify_password(current, &user.password_hash) {
        return Err(ApiError::bad_request("Current password is incorrect."));
    }

    let new_hash = hash_password(new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal()
    })?;

    sqlx::query("UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(&new_hash)
        .bind(&auth.id)
        .execute(&state.db)
        .await?;

    Ok(MessageResponse::ok("Password changed successfully."))
}

/// POST /auth/forgot-password: step 1, fetch the security question
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<SecurityQuestionResponse>, ApiError> {
    let email = req.email.as_deref().unwrap_or("").trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required."));
    }

    let user = find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::not_found("No account found with this email."))?;

    Ok(Json(SecurityQuestionResponse {
        success: true,
        security_question: user.security_question,
    }))
}

/// POST /auth/reset-password-with-answer: step 2, answer and reset
pub async fn reset_password_with_answer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = req.email.as_deref().unwrap_or("").trim();
    let answer = req.security_answer.as_deref().unwrap_or("");
    let new_password = req.new_password.as_deref().unwrap_or("");

    if email.is_empty() || answer.is_empty() || new_password.is_empty() {
        return Err(ApiError::bad_request(
            "Email, security answer and new password are required.",
        ));
    }

    validate_password(new_password).map_err(ApiError::bad_request)?;

    let user = find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::not_found("No account found with this email."))?;

    if !verify_password(answer, &user.security_answer_hash) {
        return Err(ApiError::bad_request("Security answer is incorrect."));
    }

    let new_hash = hash_password(new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal()
    })?;

    sqlx::query("UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(&new_hash)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    Ok(MessageResponse::ok(
        "Password reset successfully. You can now log in with your new password.",
    ))
}

mod attendance;
pub mod auth;
mod enrollment;
pub mod error;
mod menu;
mod mess;
mod notice;
mod policy;
mod validation;

#[cfg(test)]
pub(crate) mod testutil;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/change-password", put(auth::change_password))
        .route("/forgot-password", post(auth::forgot_password))
        .route(
            "/reset-password-with-answer",
            post(auth::reset_password_with_answer),
        );

    let mess_routes = Router::new()
        // Admin
        .route("/create", post(mess::create_mess))
        .route("/my", get(mess::get_my_mess))
        .route("/update/:id", put(mess::update_mess))
        .route("/delete/:id", delete(mess::delete_mess))
        // Public
        .route("/all", get(mess::list_approved))
        // Super admin
        .route("/pending", get(mess::pending_messes))
        .route("/approve", post(mess::approve_mess))
        .route("/reject", post(mess::reject_mess))
        .route("/all-admin", get(mess::all_messes_admin));

    let enrollment_routes = Router::new()
        .route("/request", post(enrollment::request_join))
        .route("/pending", get(enrollment::pending_requests))
        .route("/approve", post(enrollment::approve_request))
        .route("/reject", post(enrollment::reject_request))
        .route("/status", get(enrollment::enrollment_status))
        .route("/remove/:id", delete(enrollment::remove_student))
        .route("/my", get(enrollment::my_enrollments))
        .route("/enrolled", get(enrollment::enrolled_students));

    let attendance_routes = Router::new()
        .route("/mark", post(attendance::mark_attendance))
        .route("/today", get(attendance::today_count))
        .route("/today/details", get(attendance::today_details))
        .route("/history", get(attendance::history));

    let menu_routes = Router::new()
        .route("/my", get(menu::get_admin_menu))
        .route("/my", post(menu::save_admin_menu))
        .route("/student", get(menu::get_student_menus));

    let notice_routes = Router::new()
        .route("/create", post(notice::create_notice))
        .route("/my", get(notice::list_my_notices))
        .route("/delete/:id", delete(notice::delete_notice))
        .route("/student", get(notice::list_student_notices));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .nest("/mess", mess_routes)
        .nest("/enrollment", enrollment_routes)
        .nest("/attendance", attendance_routes)
        .nest("/menu", menu_routes)
        .nest("/notice", notice_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Messhall backend running"
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Json, State};
    use axum::http::StatusCode;
    use crate::db::{EnrollmentActionRequest, JoinRequest, MarkAttendanceRequest, MessActionRequest};

    /// The full student journey: the mess appears publicly once approved,
    /// enrollment goes pending -> approved, and attendance marks once per
    /// day.
    #[tokio::test]
    async fn test_register_enroll_attend_flow() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "admin@hostel.edu").await;
        let student = testutil::register_user(&state, "student", "student@hostel.edu").await;
        let super_admin = testutil::super_admin(&state).await;

        let mess_id = testutil::create_mess(&state, &admin, "Sunrise Mess").await;

        // Pending messes are invisible to students
        let listing = mess::list_approved(State(state.clone())).await.unwrap();
        assert!(listing.0.messes.is_empty());

        mess::approve_mess(
            State(state.clone()),
            super_admin,
            Json(MessActionRequest {
                mess_id: Some(mess_id.clone()),
            }),
        )
        .await
        .unwrap();

        let listing = mess::list_approved(State(state.clone())).await.unwrap();
        assert_eq!(listing.0.messes.len(), 1);

        enrollment::request_join(
            State(state.clone()),
            student.clone(),
            Json(JoinRequest {
                mess_id: Some(mess_id.clone()),
            }),
        )
        .await
        .unwrap();

        let pending = enrollment::pending_requests(State(state.clone()), admin.clone())
            .await
            .unwrap();
        assert_eq!(pending.0.requests.len(), 1);
        let enrollment_id = pending.0.requests[0].id.clone();

        enrollment::approve_request(
            State(state.clone()),
            admin.clone(),
            Json(EnrollmentActionRequest {
                enrollment_id: Some(enrollment_id),
            }),
        )
        .await
        .unwrap();

        let status = enrollment::enrollment_status(State(state.clone()), student.clone())
            .await
            .unwrap();
        assert_eq!(status.0.status, "approved");
        assert_eq!(status.0.mess_id.as_deref(), Some(mess_id.as_str()));

        let mark = |st: Arc<AppState>, student: auth::AuthUser, mess_id: String| async move {
            attendance::mark_attendance(
                State(st),
                student,
                Json(MarkAttendanceRequest {
                    mess_id: Some(mess_id),
                }),
            )
            .await
        };

        mark(state.clone(), student.clone(), mess_id.clone())
            .await
            .unwrap();
        let err = mark(state.clone(), student.clone(), mess_id.clone())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let count = attendance::today_count(State(state.clone()), admin)
            .await
            .unwrap();
        assert_eq!(count.0.attendance[0].present_students, 1);
    }
}

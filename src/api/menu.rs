//! Weekly menus: one lunch/dinner row per day per mess, replaced as a whole
//! week.

use axum::{extract::State, Json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{
    AdminMenuResponse, DayMenu, MenuEntry, MenuMessRef, SaveMenuRequest, StudentMenuRow,
    StudentMenusResponse, DAYS,
};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, MessageResponse};
use super::mess::find_by_admin;
use super::policy::{self, Action};

/// SQLite has no FIELD(); canonical day order via CASE.
const DAY_ORDER: &str = r#"
    CASE day_of_week
        WHEN 'monday' THEN 1
        WHEN 'tuesday' THEN 2
        WHEN 'wednesday' THEN 3
        WHEN 'thursday' THEN 4
        WHEN 'friday' THEN 5
        WHEN 'saturday' THEN 6
        WHEN 'sunday' THEN 7
    END
"#;

/// GET /menu/my, the admin's weekly menu with every day present
pub async fn get_admin_menu(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AdminMenuResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let mess = match find_by_admin(&state.db, &auth.id).await? {
        Some(mess) => mess,
        None => {
            return Ok(Json(AdminMenuResponse {
                success: true,
                mess: None,
                menu: None,
            }))
        }
    };

    let sql = format!(
        "SELECT day_of_week, lunch, dinner FROM mess_menus WHERE mess_id = ? ORDER BY {DAY_ORDER}"
    );
    let rows: Vec<MenuEntry> = sqlx::query_as(&sql).bind(&mess.id).fetch_all(&state.db).await?;

    // Every day appears in the response, stored or not
    let mut menu: HashMap<String, DayMenu> = DAYS
        .iter()
        .map(|day| (day.to_string(), DayMenu::default()))
        .collect();
    for row in rows {
        menu.insert(
            row.day_of_week,
            DayMenu {
                lunch: row.lunch,
                dinner: row.dinner,
            },
        );
    }

    Ok(Json(AdminMenuResponse {
        success: true,
        mess: Some(MenuMessRef {
            id: mess.id,
            name: mess.name,
        }),
        menu: Some(menu),
    }))
}

/// POST /menu/my, replacing the whole week in one transaction
pub async fn save_admin_menu(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<SaveMenuRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    policy::require(&auth, Action::ManageMess)?;

    let menu = req
        .menu
        .ok_or_else(|| ApiError::bad_request("menu object is required."))?;

    let mess = find_by_admin(&state.db, &auth.id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Create a mess first."))?;

    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM mess_menus WHERE mess_id = ?")
        .bind(&mess.id)
        .execute(&mut *tx)
        .await?;

    for day in DAYS {
        let Some(day_menu) = menu.get(day) else {
            continue;
        };

        // Days with neither meal are omitted, not stored as empty rows
        if day_menu.lunch.is_empty() && day_menu.dinner.is_empty() {
            continue;
        }

        sqlx::query(
            "INSERT INTO mess_menus (id, mess_id, day_of_week, lunch, dinner) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&mess.id)
        .bind(day)
        .bind(&day_menu.lunch)
        .bind(&day_menu.dinner)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(MessageResponse::ok("Menu saved successfully."))
}

/// GET /menu/student, menus of every mess the student is currently
/// enrolled in
pub async fn get_student_menus(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<StudentMenusResponse>, ApiError> {
    policy::require(&auth, Action::AttendMess)?;

    let sql = format!(
        r#"
        SELECT
            mm.mess_id,
            m.name AS mess_name,
            mm.day_of_week,
            mm.lunch,
            mm.dinner
        FROM mess_menus mm
        JOIN messes m ON mm.mess_id = m.id
        JOIN student_mess_enrollments e ON e.mess_id = mm.mess_id
        WHERE e.student_id = ?
          AND e.status = 'approved'
          AND e.is_current = 1
        ORDER BY m.name, {}
        "#,
        DAY_ORDER.replace("day_of_week", "mm.day_of_week")
    );
    let menus: Vec<StudentMenuRow> = sqlx::query_as(&sql)
        .bind(&auth.id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(StudentMenusResponse {
        success: true,
        menus,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil;

    fn week(entries: &[(&str, &str, &str)]) -> HashMap<String, DayMenu> {
        entries
            .iter()
            .map(|(day, lunch, dinner)| {
                (
                    day.to_string(),
                    DayMenu {
                        lunch: lunch.to_string(),
                        dinner: dinner.to_string(),
                    },
                )
            })
            .collect()
    }

    async fn save(
        state: &Arc<AppState>,
        admin: &AuthUser,
        menu: HashMap<String, DayMenu>,
    ) -> Result<(), ApiError> {
        save_admin_menu(
            State(state.clone()),
            admin.clone(),
            Json(SaveMenuRequest { menu: Some(menu) }),
        )
        .await
        .map(|_| ())
    }

    #[tokio::test]
    async fn test_save_replaces_previous_week() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;
        let mess_id = testutil::create_approved_mess(&state, &admin, "Sunrise Mess").await;

        save(
            &state,
            &admin,
            week(&[
                ("monday", "Poha", "Dal rice"),
                ("tuesday", "Idli", "Roti sabzi"),
                ("friday", "", "Biryani"),
            ]),
        )
        .await
        .unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM mess_menus WHERE mess_id = ?")
            .bind(&mess_id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count.0, 3);

        // Saving a week with only Monday lunch leaves exactly one row
        save(&state, &admin, week(&[("monday", "Poha", "")]))
            .await
            .unwrap();

        let rows: Vec<MenuEntry> =
            sqlx::query_as("SELECT day_of_week, lunch, dinner FROM mess_menus WHERE mess_id = ?")
                .bind(&mess_id)
                .fetch_all(&state.db)
                .await
                .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].day_of_week, "monday");
        assert_eq!(rows[0].lunch, "Poha");
        assert_eq!(rows[0].dinner, "");
    }

    #[tokio::test]
    async fn test_empty_days_are_omitted() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;
        let mess_id = testutil::create_approved_mess(&state, &admin, "Sunrise Mess").await;

        save(
            &state,
            &admin,
            week(&[("monday", "", ""), ("sunday", "Chole", "Kheer")]),
        )
        .await
        .unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM mess_menus WHERE mess_id = ?")
            .bind(&mess_id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_admin_menu_lists_all_seven_days() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;
        testutil::create_approved_mess(&state, &admin, "Sunrise Mess").await;

        save(&state, &admin, week(&[("wednesday", "Pulao", "")]))
            .await
            .unwrap();

        let resp = get_admin_menu(State(state.clone()), admin).await.unwrap();
        let menu = resp.0.menu.unwrap();
        assert_eq!(menu.len(), 7);
        assert_eq!(menu["wednesday"].lunch, "Pulao");
        assert_eq!(menu["monday"].lunch, "");
        assert_eq!(menu["sunday"].dinner, "");
    }

    #[tokio::test]
    async fn test_admin_without_mess_gets_nulls() {
        let state = testutil::state().await;
        let admin = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;

        let resp = get_admin_menu(State(state.clone()), admin).await.unwrap();
        assert!(resp.0.mess.is_none());
        assert!(resp.0.menu.is_none());
    }

    #[tokio::test]
    async fn test_student_sees_only_current_enrollment_menus() {
        let state = testutil::state().await;
        let admin_a = testutil::register_user(&state, "mess_admin", "a@hostel.edu").await;
        let admin_b = testutil::register_user(&state, "mess_admin", "b@hostel.edu").await;
        let student = testutil::register_user(&state, "student", "s@hostel.edu").await;
        let mess_a = testutil::create_approved_mess(&state, &admin_a, "Alpha Mess").await;
        testutil::create_approved_mess(&state, &admin_b, "Beta Mess").await;

        save(&state, &admin_a, week(&[("monday", "Poha", "Dal")]))
            .await
            .unwrap();
        save(&state, &admin_b, week(&[("monday", "Upma", "Rajma")]))
            .await
            .unwrap();

        testutil::enroll_approved(&state, &student, &mess_a).await;

        let resp = get_student_menus(State(state.clone()), student).await.unwrap();
        assert_eq!(resp.0.menus.len(), 1);
        assert_eq!(resp.0.menus[0].mess_name, "Alpha Mess");
        assert_eq!(resp.0.menus[0].lunch, "Poha");
    }
}

//! Weekly menu rows and the day-keyed payloads the menu endpoints exchange.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// Canonical day order used everywhere a week is rendered or validated.
pub const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuEntry {
    pub day_of_week: String,
    pub lunch: String,
    pub dinner: String,
}

/// Menu row joined with the mess it belongs to, for the student view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentMenuRow {
    pub mess_id: String,
    pub mess_name: String,
    pub day_of_week: String,
    pub lunch: String,
    pub dinner: String,
}

/// Lunch and dinner text for a single day. Both default to empty strings so
/// a partial body still replaces the whole day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayMenu {
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub dinner: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveMenuRequest {
    pub menu: Option<HashMap<String, DayMenu>>,
}

/// Slim mess reference in the admin menu response.
#[derive(Debug, Serialize)]
pub struct MenuMessRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AdminMenuResponse {
    pub success: bool,
    pub mess: Option<MenuMessRef>,
    pub menu: Option<HashMap<String, DayMenu>>,
}

#[derive(Debug, Serialize)]
pub struct StudentMenusResponse {
    pub success: bool,
    pub menus: Vec<StudentMenuRow>,
}

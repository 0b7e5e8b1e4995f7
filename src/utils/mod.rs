use anyhow::{Context, Result};
use std::path::Path;

/// Create a directory (and parents) if it does not exist.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Today's calendar day in the server's local timezone, as YYYY-MM-DD.
///
/// Attendance is keyed on this value, so "one mark per day" means one mark
/// per server-local day.
pub fn today_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

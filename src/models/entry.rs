use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A saved library entry. The owner is set at creation and never changes.
#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub link: String,
}

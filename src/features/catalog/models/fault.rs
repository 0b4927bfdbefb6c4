use serde::Serialize;
use sqlx::FromRow;

/// Row of `fallas`, always scoped to one category
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fault {
    pub id: i32,
    pub category_id: i32,
    pub description: String,
    pub info: Option<String>,
}

use serde::Serialize;
use sqlx::FromRow;

/// Row of `categorias`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    /// Informational blurb shown next to the category
    pub info: Option<String>,
}

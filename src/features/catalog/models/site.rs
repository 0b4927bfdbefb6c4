use serde::Serialize;
use sqlx::FromRow;

/// Row of `sedes`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Site {
    pub id: i32,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Row of `reportes`.
///
/// `category_id`, `fault_id` and `site_id` point into the catalog and sites
/// datastores; nothing guarantees they resolve.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: i32,
    pub cedula: String,
    pub category_id: Option<i32>,
    pub fault_id: Option<i32>,
    pub other_fault: Option<String>,
    pub site_id: Option<i32>,
    /// Relative to the static directory, e.g. `uploads/123_foto.jpg`
    pub photo_path: Option<String>,
    pub description: Option<String>,
    pub reported_at: DateTime<Utc>,
}

/// Data for creating a new report
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub cedula: String,
    pub category_id: Option<i32>,
    pub fault_id: Option<i32>,
    pub other_fault: Option<String>,
    pub site_id: Option<i32>,
    pub photo_path: Option<String>,
    pub description: Option<String>,
}

/// Editable fields of a report. Category and citizen id never change.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub fault_id: Option<i32>,
    pub site_id: Option<i32>,
    pub description: Option<String>,
    pub photo_path: Option<String>,
}

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::catalog::services::LabelMaps;
use crate::features::reports::models::Report;
use crate::modules::storage::PhotoStore;

/// Query params for a citizen's report listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CedulaQuery {
    pub cedula: Option<String>,
}

impl CedulaQuery {
    pub fn cedula(&self) -> Option<&str> {
        self.cedula.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Report with every soft reference replaced by its display label
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResolvedReportView {
    pub id: i32,
    pub cedula: String,
    pub categoria: String,
    pub tipo_falla: String,
    pub fallas_otros: Option<String>,
    pub sede: String,
    pub foto_path: Option<String>,
    pub foto_url: Option<String>,
    pub descripcion: Option<String>,
    pub fecha_reporte: String,
    /// Site coordinates for map markers
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

impl ResolvedReportView {
    pub fn resolve(report: Report, labels: &LabelMaps) -> Self {
        let (latitud, longitud) = labels.site_location(report.site_id);

        Self {
            id: report.id,
            categoria: labels.category(report.category_id).to_string(),
            tipo_falla: labels.fault(report.fault_id).to_string(),
            sede: labels.site(report.site_id).to_string(),
            foto_url: report.photo_path.as_deref().map(PhotoStore::public_url),
            fecha_reporte: report.reported_at.format("%Y-%m-%d %H:%M").to_string(),
            cedula: report.cedula,
            fallas_otros: report.other_fault,
            foto_path: report.photo_path,
            descripcion: report.description,
            latitud,
            longitud,
        }
    }

    pub fn resolve_all(reports: Vec<Report>, labels: &LabelMaps) -> Vec<Self> {
        reports
            .into_iter()
            .map(|r| Self::resolve(r, labels))
            .collect()
    }
}
